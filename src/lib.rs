//! Melodia - Desktop Music Library
//!
//! A small desktop music player: browse a fixed song catalog, curate
//! playlists and play audio files with transport controls and a progress
//! display. The playback controller drives one audio engine session at a
//! time; the Libadwaita shell and the native symphonia/cpal engine are
//! built with the `desktop` feature.

pub mod audio;
pub mod config;
pub mod error;
pub mod library;
pub mod state;
#[cfg(feature = "desktop")]
pub mod ui;

// Re-export key types for convenience
#[cfg(feature = "desktop")]
pub use ui::MelodiaApplication;
pub use {
    audio::controller::{PlaybackController, PlaybackEvent, PlaybackStatus},
    config::{SettingsManager, UserSettings},
    error::{AudioError, LibraryError, Notice, PlaybackError, UiError},
    library::{MusicLibrary, Playlist, Song, User},
    state::{AppState, AppStateEvent, UserAction},
};
