//! Song catalog and user-curated playlists.
//!
//! This module holds the in-memory data model: immutable `Song` values,
//! the read-only `MusicLibrary`, and the `User` who owns `Playlist`s.

pub mod catalog;
pub mod models;
pub mod playlist;
pub mod user;

pub use {catalog::MusicLibrary, models::Song, playlist::Playlist, user::User};
