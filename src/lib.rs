//! `timestamper`: the core of a playback-synchronized stamp editor.
//!
//! This crate provides:
//! - A stamp timeline model with voices (parallel tracks of stamps)
//! - Pure stamp store operations and pivot/coverage lookups
//! - A tick-driven snippet controller for preview and loop playback
//! - Contextual keyboard shortcut dispatch
//! - Per-media persistence and JSON/CSV export
//!
//! Rendering, the media engine and file picking stay with the host. The host drives an
//! [`Editor`] through commands and a per-frame `tick`, and renders the snapshots it gets back.

mod error;

// High-level API (most consumers should start here).
pub mod editor;
pub mod opts;

// Timeline data model.
pub mod stamp;
pub mod timeline;

// Stamp editing and lookups.
pub mod pivot;
pub mod store;

// Playback.
pub mod clock;
pub mod snippet;

// Input handling.
pub mod media;
pub mod shortcuts;

// Persistence and export.
pub mod export;
pub mod output_type;
pub mod persist;
pub mod stamp_encoder;

// Output encoders that serialize stamps into various formats.
pub mod csv_encoder;
pub mod json_encoder;

pub mod timecode;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use crate::clock::{Clock, SimulatedClock};
pub use crate::editor::{Editor, Snapshot};
pub use crate::error::{Error, Result};
pub use crate::opts::Opts;
pub use crate::output_type::OutputType;
pub use crate::persist::{DirStore, MemoryStore, SessionStore};
pub use crate::stamp::{Stamp, StampId};
pub use crate::timeline::{Timeline, Voice};

#[cfg(feature = "logging")]
pub use crate::logging::init as init_logging;
