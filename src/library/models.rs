//! Data model for a single catalog song.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// One track of the catalog.
///
/// Songs are immutable values. Two songs are the same song when every
/// field matches, which is how playlists find entries to remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    /// Track title.
    title: String,
    /// Performing artist.
    artist: String,
    /// Genre label.
    genre: String,
    /// Informational length in whole seconds.
    duration_seconds: u32,
    /// Media path relative to the asset root.
    file_path: String,
}

impl Song {
    /// Creates a new song.
    ///
    /// # Arguments
    ///
    /// * `title` - Track title.
    /// * `artist` - Performing artist.
    /// * `genre` - Genre label.
    /// * `duration_seconds` - Length in whole seconds.
    /// * `file_path` - Media path relative to the asset root.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
        duration_seconds: u32,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            genre: genre.into(),
            duration_seconds,
            file_path: file_path.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Catalog length as a `Duration`.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_seconds))
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }
}

impl Display for Song {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} — {}", self.title, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::library::models::Song;

    #[test]
    fn test_song_display_and_accessors() {
        let song = Song::new("Пиян", "Преслава", "Pop-Folk", 205, "audio/preslava_piyan.mp3");

        assert_eq!(song.to_string(), "Пиян — Преслава");
        assert_eq!(song.genre(), "Pop-Folk");
        assert_eq!(song.duration(), Duration::from_secs(205));
        assert_eq!(song.file_path(), "audio/preslava_piyan.mp3");
    }

    #[test]
    fn test_song_value_equality() {
        let a = Song::new("Euphoria", "Галена", "Pop-Folk", 210, "audio/galena_euphoria.mp3");
        let b = a.clone();
        let other_path = Song::new("Euphoria", "Галена", "Pop-Folk", 210, "audio/other.mp3");

        assert_eq!(a, b);
        assert_ne!(a, other_path);
    }
}
