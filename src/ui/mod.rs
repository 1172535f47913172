//! Libadwaita user interface.
//!
//! This module provides the main application window, the header bar with
//! the playlist switcher, the library and playlist panels, the player
//! controls and notice dialogs.

pub mod application;
pub mod header_bar;
pub mod library_panel;
pub mod notice;
pub mod player_bar;
pub mod playlist_panel;

pub use {
    application::{Dispatcher, MelodiaApplication},
    header_bar::HeaderBar,
    library_panel::LibraryPanel,
    player_bar::PlayerBar,
    playlist_panel::PlaylistPanel,
};
