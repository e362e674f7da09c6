use crate::clock::{MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};
use crate::snippet::PreviewExpiry;

/// Options that control how an editor session behaves.
///
/// This struct represents *library-level configuration*, not CLI flags directly. Frontends map
/// their own settings into it so the editor core stays reusable across hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// When a one-shot preview of a stamp without an end time stops.
    pub preview_expiry: PreviewExpiry,

    /// Amount the speed-up/slow-down commands change the playback rate by.
    pub playback_rate_step: f64,

    /// Slowest playback rate the editor will set.
    pub min_playback_rate: f64,

    /// Fastest playback rate the editor will set.
    pub max_playback_rate: f64,

    /// Whether every stamp edit is written to the session store immediately.
    ///
    /// Disable for hosts that save explicitly via `Editor::persist`.
    pub autosave: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            preview_expiry: PreviewExpiry::default(),
            playback_rate_step: 0.1,
            min_playback_rate: MIN_PLAYBACK_RATE,
            max_playback_rate: MAX_PLAYBACK_RATE,
            autosave: true,
        }
    }
}

impl Opts {
    /// Clamp a playback rate into the configured range.
    pub fn clamp_playback_rate(&self, rate: f64) -> f64 {
        rate.clamp(self.min_playback_rate, self.max_playback_rate)
    }
}
