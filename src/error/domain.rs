//! Domain-specific error types using `thiserror`.
//!
//! This module defines the error enums for the audio engine, the playback
//! controller, catalog loading and the desktop shell.

use std::{io::Error as IoError, path::PathBuf};

use {serde_json::Error as SerdeJsonError, thiserror::Error};

#[cfg(feature = "desktop")]
use crate::audio::{decoder::DecoderError, output::OutputError};
use crate::audio::metadata::MetadataError;

/// Errors raised by an audio engine or one of its sessions.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Decoder error from the native decoder thread.
    #[cfg(feature = "desktop")]
    #[error("Decoder error: {0}")]
    DecoderError(#[from] DecoderError),
    /// Output error from the native output stream.
    #[cfg(feature = "desktop")]
    #[error("Output error: {0}")]
    OutputError(#[from] OutputError),
    /// Metadata error while probing a media file.
    #[error("Metadata error: {0}")]
    MetadataError(#[from] MetadataError),
    /// Invalid operation for current state.
    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },
    /// The engine reported an asynchronous failure.
    #[error("Engine failure: {0}")]
    EngineFailure(String),
    /// The session was already torn down by the engine.
    #[error("Engine session is closed")]
    SessionClosed,
}

/// Recoverable failures of a playback request.
///
/// Both kinds are surfaced to the user as a notice and never leave the
/// controller in a half-torn-down state.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The song's file path does not resolve to a readable file.
    #[error("Media file not found: {}", path.display())]
    MediaNotFound { path: PathBuf },
    /// The engine failed to load, decode or drive the resource.
    #[error("Playback failed: {0}")]
    Engine(#[from] AudioError),
}

/// Catalog loading errors.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Failed to read the catalog file.
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    /// Catalog file is not valid JSON for the expected shape.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Catalog entry with unusable values.
    #[error("Invalid data: {reason}")]
    InvalidData { reason: String },
}

/// UI-related errors.
#[derive(Error, Debug)]
pub enum UiError {
    /// GTK/Libadwaita or startup collaborator initialization error.
    #[error("UI initialization error: {0}")]
    InitializationError(String),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::error::domain::{AudioError, LibraryError, PlaybackError, UiError};

    #[test]
    fn test_audio_error_display() {
        assert_eq!(
            AudioError::SessionClosed.to_string(),
            "Engine session is closed"
        );

        let invalid_op_error = AudioError::InvalidOperation {
            reason: "test reason".to_string(),
        };
        assert_eq!(
            invalid_op_error.to_string(),
            "Invalid operation: test reason"
        );
    }

    #[test]
    fn test_playback_error_display() {
        let missing = PlaybackError::MediaNotFound {
            path: PathBuf::from("audio/missing.mp3"),
        };
        assert_eq!(
            missing.to_string(),
            "Media file not found: audio/missing.mp3"
        );

        let engine: PlaybackError = AudioError::SessionClosed.into();
        assert_eq!(
            engine.to_string(),
            "Playback failed: Engine session is closed"
        );
    }

    #[test]
    fn test_library_and_ui_error_display() {
        let invalid_data_error = LibraryError::InvalidData {
            reason: "empty title".to_string(),
        };
        assert_eq!(invalid_data_error.to_string(), "Invalid data: empty title");

        let init_error = UiError::InitializationError("Failed to init GTK".to_string());
        assert_eq!(
            init_error.to_string(),
            "UI initialization error: Failed to init GTK"
        );
    }
}
