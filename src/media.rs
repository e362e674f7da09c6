use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A file offered by the host's file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    /// MIME type as reported by the host, e.g. `audio/mpeg`.
    pub mime_type: String,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Which kind of player the host should mount for a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Derive the kind from a MIME type of the form `audio/<sub>` or `video/<sub>`.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let (top, sub) = mime_type.split_once('/')?;
        if sub.is_empty() {
            return None;
        }
        top.parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    /// Anything but `audio`/`video` means the MIME guard was skipped.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(Error::UnexpectedMediaKind(other.to_owned())),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media file that passed the input checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSelection {
    pub name: String,
    pub kind: MediaKind,
}

/// Validate a file-picker selection.
///
/// An empty selection (the picker was cancelled) yields `Ok(None)`.
pub fn select_media(files: &[MediaFile]) -> Result<Option<MediaSelection>> {
    let file = match files {
        [] => return Ok(None),
        [file] => file,
        _ => return Err(Error::MultipleFiles(files.len())),
    };

    let kind = MediaKind::from_mime(&file.mime_type)
        .ok_or_else(|| Error::UnsupportedMediaType(file.mime_type.clone()))?;

    Ok(Some(MediaSelection {
        name: file.name.clone(),
        kind,
    }))
}

/// Blocking user dialogs the host provides.
pub trait Prompt {
    /// Show a message the user has to acknowledge.
    fn alert(&mut self, message: &str);

    /// Ask a yes/no question; `true` means the user agreed.
    fn confirm(&mut self, message: &str) -> bool;
}
