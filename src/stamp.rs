use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a stamp for the lifetime of an editor session.
///
/// Positions inside a voice shift whenever a stamp is inserted or deleted, so anything that needs
/// to keep pointing at "that stamp" across edits (the snippet controller, mostly) holds one of
/// these instead of an index. Ids are never persisted; loading a session mints fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StampId(Uuid);

impl StampId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StampId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A labelled time point (open) or time range (closed) within the media's timeline.
///
/// Times are in seconds. The serialized shape is `{ startTime, endTime?, text }`; an open stamp
/// omits `endTime` entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    #[serde(skip)]
    pub id: StampId,

    pub start_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,

    #[serde(default)]
    pub text: String,
}

impl Stamp {
    /// Create an open stamp with no text.
    pub fn open(start_time: f64) -> Self {
        Self {
            id: StampId::new(),
            start_time,
            end_time: None,
            text: String::new(),
        }
    }

    /// Create a closed stamp spanning `start_time..end_time`.
    pub fn closed(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            id: StampId::new(),
            start_time,
            end_time: Some(end_time),
            text: text.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Compare the persisted fields only, ignoring the session-local id.
    pub fn same_content(&self, other: &Stamp) -> bool {
        self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.text == other.text
    }
}
