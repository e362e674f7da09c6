//! Playback clock abstraction.
//!
//! The media engine is the source of truth for playback position. The editor only ever reads it
//! through [`Clock`] and issues fire-and-forget commands (seek, play, pause); it re-reads state on
//! the next tick instead of waiting for a seek to land.

/// Resolution of the engine's time values, in seconds.
pub const TIME_PRECISION: f64 = 1e-6;

const TICKS_PER_SECOND: f64 = 1_000_000.0;

/// Default slowest playback rate the editor will set.
pub const MIN_PLAYBACK_RATE: f64 = 0.25;

/// Default fastest playback rate the editor will set.
pub const MAX_PLAYBACK_RATE: f64 = 1.5;

/// Bias a seek target up by one precision unit.
///
/// Engines truncate seek targets to 6 decimal places. Seeking straight to a stamp boundary can
/// read back just below it, which makes a `current < start` check re-seek forever. Targeting the
/// next microsecond guarantees the read-back is at or past the boundary.
pub fn safe_seek_target(target_seconds: f64) -> f64 {
    (target_seconds * TICKS_PER_SECOND + 1.0).trunc() / TICKS_PER_SECOND
}

/// A media playback engine.
pub trait Clock {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Media duration in seconds, `None` until metadata is known.
    fn duration(&self) -> Option<f64>;

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    fn paused(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    /// Raw seek; the engine may truncate the target.
    fn seek(&mut self, seconds: f64);

    /// Seek to a boundary such that the read-back position is not before it.
    fn seek_safely(&mut self, target_seconds: f64) {
        self.seek(safe_seek_target(target_seconds));
    }
}

/// An in-process playback engine.
///
/// Time only moves when the host calls [`SimulatedClock::advance`]. Seeks are truncated to the
/// engine precision the same way a browser media element does, which makes this useful for
/// headless hosts and for exercising the truncation behavior in tests.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    current_time: f64,
    duration: Option<f64>,
    playback_rate: f64,
    paused: bool,
}

impl SimulatedClock {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            current_time: 0.0,
            duration,
            playback_rate: 1.0,
            paused: true,
        }
    }

    /// Advance playback by `wall_seconds` of host time, scaled by the playback rate.
    ///
    /// Reaching the end of known media pauses playback.
    pub fn advance(&mut self, wall_seconds: f64) {
        if self.paused {
            return;
        }
        self.current_time += wall_seconds * self.playback_rate;
        if let Some(duration) = self.duration {
            if self.current_time >= duration {
                self.current_time = duration;
                self.paused = true;
            }
        }
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Clock for SimulatedClock {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        let mut target = truncate_to_precision(seconds.max(0.0));
        if let Some(duration) = self.duration {
            target = target.min(duration);
        }
        self.current_time = target;
    }
}

/// Largest whole-microsecond value that does not exceed `seconds`.
fn truncate_to_precision(seconds: f64) -> f64 {
    let ticks = (seconds * TICKS_PER_SECOND).round();
    if ticks / TICKS_PER_SECOND > seconds {
        (ticks - 1.0) / TICKS_PER_SECOND
    } else {
        ticks / TICKS_PER_SECOND
    }
}
