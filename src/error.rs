use std::error::Error as StdError;

use thiserror::Error;

/// Timestamper's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Timestamper's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// More than one file was handed to the media input.
    #[error("Only a single file is allowed. You've selected {0}.")]
    MultipleFiles(usize),

    /// The selected file is neither audio nor video.
    #[error("Only audio and video files are allowed. You've selected {0}.")]
    UnsupportedMediaType(String),

    /// A media kind other than `audio`/`video` reached player selection.
    ///
    /// This means the MIME-type guard was bypassed and is a programming error.
    #[error("Unexpected media type {0}. Expected 'audio' or 'video'.")]
    UnexpectedMediaKind(String),

    /// A voice with this name already exists in the timeline.
    #[error("a voice named '{0}' already exists")]
    DuplicateVoice(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error stems from user input that the host should surface as an alert.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::MultipleFiles(_) | Self::UnsupportedMediaType(_) | Self::DuplicateVoice(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
