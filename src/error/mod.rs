//! Error handling built on `thiserror` and `anyhow`.
//!
//! Domain enums describe what went wrong in the audio, library and UI
//! layers. The operational half adds context propagation, leveled
//! reporting and the user-visible `Notice` text.

pub mod domain;
pub mod operational;

pub use {
    domain::{AudioError, LibraryError, PlaybackError, UiError},
    operational::{ErrorReporter, Notice, ResultExt},
};
