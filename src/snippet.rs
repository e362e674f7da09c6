//! Preview and loop playback confined to a single stamp.
//!
//! The controller never advances time itself. The host calls [`SnippetController::tick`] once per
//! frame; the controller reads the clock, compares it against the stamp it is confined to, and
//! may issue a seek or a pause. Seeks land asynchronously, so a tick that still sees the old
//! position just gets corrected on the next one.

use tracing::debug;

use crate::clock::Clock;
use crate::stamp::{Stamp, StampId};
use crate::timeline::Timeline;

/// When a one-shot preview of an *open* stamp ends.
///
/// Closed stamps always end at `end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewExpiry {
    /// The preview keeps playing until stopped or scrubbed away.
    #[default]
    Never,
    /// The preview ends once playback passes the stamp's start.
    AtStart,
}

/// Playback confinement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnippetState {
    #[default]
    Idle,
    /// Playing a stamp once.
    Previewing { voice: usize, stamp: StampId },
    /// Playing a stamp over and over.
    Looping { voice: usize, stamp: StampId },
}

impl SnippetState {
    fn target(&self) -> Option<(usize, StampId)> {
        match *self {
            Self::Idle => None,
            Self::Previewing { voice, stamp } | Self::Looping { voice, stamp } => {
                Some((voice, stamp))
            }
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Self::Looping { .. })
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No snippet is active.
    Idle,
    /// Playback is inside the stamp; nothing to do.
    Continue,
    /// A loop left its stamp and was sent back to the start.
    Reseeked,
    /// A preview reached its end; playback was paused.
    Expired,
    /// Playback was moved before a previewed stamp; the preview was dropped.
    ScrubbedBefore,
    /// The stamp the snippet pointed at no longer exists.
    Invalidated,
}

#[derive(Debug, Clone, Default)]
pub struct SnippetController {
    state: SnippetState,
    expiry: PreviewExpiry,
}

impl SnippetController {
    pub fn new(expiry: PreviewExpiry) -> Self {
        Self {
            state: SnippetState::Idle,
            expiry,
        }
    }

    pub fn state(&self) -> SnippetState {
        self.state
    }

    /// Play `stamp` once from its start.
    pub fn preview<C: Clock>(&mut self, clock: &mut C, voice: usize, stamp: &Stamp) {
        Self::start(clock, stamp);
        self.state = SnippetState::Previewing {
            voice,
            stamp: stamp.id,
        };
    }

    /// Play `stamp` in a loop from its start.
    pub fn loop_stamp<C: Clock>(&mut self, clock: &mut C, voice: usize, stamp: &Stamp) {
        Self::start(clock, stamp);
        self.state = SnippetState::Looping {
            voice,
            stamp: stamp.id,
        };
    }

    /// Restart playback on `stamp`, keeping whether the current snippet loops.
    pub fn retarget<C: Clock>(&mut self, clock: &mut C, voice: usize, stamp: &Stamp) {
        if self.state.is_loop() {
            self.loop_stamp(clock, voice, stamp);
        } else {
            self.preview(clock, voice, stamp);
        }
    }

    /// Full stop: pause and rewind the media to its very beginning.
    pub fn stop<C: Clock>(&mut self, clock: &mut C) {
        self.state = SnippetState::Idle;
        clock.pause();
        clock.seek(0.0);
    }

    /// Drop the snippet without touching playback.
    pub fn reset(&mut self) {
        self.state = SnippetState::Idle;
    }

    fn start<C: Clock>(clock: &mut C, stamp: &Stamp) {
        clock.seek_safely(stamp.start_time);
        clock.play();
    }

    /// Advance the state machine against the clock's current position.
    pub fn tick<C: Clock>(&mut self, clock: &mut C, timeline: &Timeline) -> TickOutcome {
        let Some((voice, id)) = self.state.target() else {
            return TickOutcome::Idle;
        };

        let Some(stamp) = timeline
            .voice(voice)
            .and_then(|v| v.stamps.iter().find(|s| s.id == id))
        else {
            debug!(%id, "snippet stamp is gone, dropping snippet");
            self.state = SnippetState::Idle;
            return TickOutcome::Invalidated;
        };

        let current_time = clock.current_time();

        if self.state.is_loop() {
            let past_end = stamp.end_time.is_some_and(|end| current_time > end);
            if current_time < stamp.start_time || past_end {
                clock.seek_safely(stamp.start_time);
                return TickOutcome::Reseeked;
            }
            return TickOutcome::Continue;
        }

        if current_time < stamp.start_time {
            debug!(%id, current_time, "playback moved before previewed stamp");
            self.state = SnippetState::Idle;
            return TickOutcome::ScrubbedBefore;
        }

        let expires_at = match (stamp.end_time, self.expiry) {
            (Some(end), _) => Some(end),
            (None, PreviewExpiry::AtStart) => Some(stamp.start_time),
            (None, PreviewExpiry::Never) => None,
        };

        match expires_at {
            Some(at) if current_time > at => {
                clock.pause();
                clock.seek_safely(at);
                self.state = SnippetState::Idle;
                TickOutcome::Expired
            }
            _ => TickOutcome::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimulatedClock;

    fn timeline_with(stamps: Vec<Stamp>) -> Timeline {
        let mut timeline = Timeline::new("song.mp3");
        timeline.replace_stamps(0, stamps);
        timeline
    }

    #[test]
    fn idle_tick_does_nothing() {
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();
        assert_eq!(snippet.tick(&mut clock, &Timeline::new("x")), TickOutcome::Idle);
        assert!(clock.paused());
    }

    #[test]
    fn preview_plays_then_pauses_at_end() {
        let stamp = Stamp::closed(2.0, 3.0, "la");
        let timeline = timeline_with(vec![stamp.clone()]);
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.preview(&mut clock, 0, &stamp);
        assert!(!clock.paused());
        assert!(clock.current_time() >= 2.0);

        clock.advance(0.5);
        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Continue);

        clock.advance(0.6);
        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Expired);
        assert!(clock.paused());
        assert!(clock.current_time() >= 3.0);
        assert_eq!(snippet.state(), SnippetState::Idle);
    }

    #[test]
    fn preview_scrubbed_before_start_goes_idle_without_seeking() {
        let stamp = Stamp::closed(2.0, 3.0, "");
        let timeline = timeline_with(vec![stamp.clone()]);
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.preview(&mut clock, 0, &stamp);
        clock.seek(1.0);
        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::ScrubbedBefore);
        assert_eq!(clock.current_time(), 1.0);
        assert!(!clock.paused());
        assert_eq!(snippet.state(), SnippetState::Idle);
    }

    #[test]
    fn open_stamp_preview_follows_expiry_policy() {
        let stamp = Stamp::open(2.0);
        let timeline = timeline_with(vec![stamp.clone()]);

        let mut clock = SimulatedClock::new(None);
        let mut never = SnippetController::new(PreviewExpiry::Never);
        never.preview(&mut clock, 0, &stamp);
        clock.advance(30.0);
        assert_eq!(never.tick(&mut clock, &timeline), TickOutcome::Continue);

        let mut clock = SimulatedClock::new(None);
        let mut at_start = SnippetController::new(PreviewExpiry::AtStart);
        at_start.preview(&mut clock, 0, &stamp);
        clock.advance(0.1);
        assert_eq!(at_start.tick(&mut clock, &timeline), TickOutcome::Expired);
        assert!(clock.paused());
    }

    #[test]
    fn loop_reseeks_to_start_and_keeps_playing() {
        let stamp = Stamp::closed(2.0, 3.0, "");
        let timeline = timeline_with(vec![stamp.clone()]);
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.loop_stamp(&mut clock, 0, &stamp);
        clock.advance(1.5);
        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Reseeked);
        assert!(!clock.paused());
        assert!(clock.current_time() >= 2.0 && clock.current_time() < 2.1);

        clock.seek(0.5);
        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Reseeked);
        assert!(snippet.state().is_loop());
    }

    #[test]
    fn loop_start_boundary_does_not_oscillate() {
        // A start time that truncates below itself must not trigger a reseek after landing.
        let stamp = Stamp::closed(0.1 + 0.2, 1.0, "");
        let timeline = timeline_with(vec![stamp.clone()]);
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.loop_stamp(&mut clock, 0, &stamp);
        for _ in 0..5 {
            assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Continue);
        }
    }

    #[test]
    fn deleted_stamp_invalidates_snippet() {
        let stamp = Stamp::closed(2.0, 3.0, "");
        let mut timeline = timeline_with(vec![stamp.clone(), Stamp::closed(4.0, 5.0, "")]);
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.loop_stamp(&mut clock, 0, &stamp);
        let remaining = timeline.stamps(0)[1..].to_vec();
        timeline.replace_stamps(0, remaining);

        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Invalidated);
        assert_eq!(snippet.state(), SnippetState::Idle);
    }

    #[test]
    fn stop_rewinds_to_zero() {
        let stamp = Stamp::closed(2.0, 3.0, "");
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.loop_stamp(&mut clock, 0, &stamp);
        snippet.stop(&mut clock);
        assert!(clock.paused());
        assert_eq!(clock.current_time(), 0.0);
        assert_eq!(snippet.state(), SnippetState::Idle);
    }

    #[test]
    fn stop_ends_preview_and_rewinds() {
        let stamp = Stamp::closed(2.0, 3.0, "");
        let timeline = timeline_with(vec![stamp.clone()]);
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.preview(&mut clock, 0, &stamp);
        clock.advance(0.5);
        snippet.stop(&mut clock);
        assert!(clock.paused());
        assert_eq!(clock.current_time(), 0.0);
        assert_eq!(snippet.state(), SnippetState::Idle);
        assert_eq!(snippet.tick(&mut clock, &timeline), TickOutcome::Idle);
    }

    #[test]
    fn retarget_keeps_loop_flag() {
        let a = Stamp::closed(2.0, 3.0, "");
        let b = Stamp::closed(5.0, 6.0, "");
        let mut clock = SimulatedClock::new(None);
        let mut snippet = SnippetController::default();

        snippet.loop_stamp(&mut clock, 0, &a);
        snippet.retarget(&mut clock, 0, &b);
        assert_eq!(snippet.state(), SnippetState::Looping { voice: 0, stamp: b.id });

        snippet.reset();
        snippet.retarget(&mut clock, 0, &a);
        assert_eq!(snippet.state(), SnippetState::Previewing { voice: 0, stamp: a.id });
        assert!(clock.current_time() >= 2.0);
    }
}
