use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stamp::{Stamp, StampId};

/// Name given to the first voice of a fresh timeline.
pub const DEFAULT_VOICE_NAME: &str = "Voice 1";

/// A named, independent track of stamps over the same media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    #[serde(default)]
    pub stamps: Vec<Stamp>,
}

impl Voice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stamps: Vec::new(),
        }
    }

    /// Current position of the stamp with `id`.
    pub fn index_of(&self, id: StampId) -> Option<usize> {
        self.stamps.iter().position(|s| s.id == id)
    }
}

/// All voices tagged against one media file.
///
/// A timeline always holds at least one voice.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub media_name: String,
    voices: Vec<Voice>,
}

impl Timeline {
    /// A timeline with a single empty voice.
    pub fn new(media_name: impl Into<String>) -> Self {
        Self {
            media_name: media_name.into(),
            voices: vec![Voice::new(DEFAULT_VOICE_NAME)],
        }
    }

    /// Build a timeline from loaded voices, falling back to one empty voice when none are given.
    ///
    /// Voice names follow the same rules as [`Timeline::add_voice`].
    pub fn with_voices(media_name: impl Into<String>, voices: Vec<Voice>) -> Result<Self> {
        let mut timeline = Self::new(media_name);
        if voices.is_empty() {
            return Ok(timeline);
        }
        for (i, voice) in voices.iter().enumerate() {
            check_voice_name(&voice.name, &voices[..i])?;
        }
        timeline.voices = voices;
        Ok(timeline)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn stamps(&self, voice: usize) -> &[Stamp] {
        self.voices
            .get(voice)
            .map(|v| v.stamps.as_slice())
            .unwrap_or_default()
    }

    /// Swap in a new stamp sequence for `voice`.
    pub(crate) fn replace_stamps(&mut self, voice: usize, stamps: Vec<Stamp>) {
        if let Some(v) = self.voices.get_mut(voice) {
            v.stamps = stamps;
        }
    }

    /// Append an empty voice and return its index.
    pub fn add_voice(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        check_voice_name(&name, &self.voices)?;
        self.voices.push(Voice::new(name));
        Ok(self.voices.len() - 1)
    }

    pub fn stamp_count(&self) -> usize {
        self.voices.iter().map(|v| v.stamps.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stamp_count() == 0
    }
}

fn check_voice_name(name: &str, existing: &[Voice]) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::msg("voice name must not be empty"));
    }
    if existing.iter().any(|v| v.name == name) {
        return Err(Error::DuplicateVoice(name.to_owned()));
    }
    Ok(())
}
