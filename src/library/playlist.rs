//! Named, ordered song collections.

use serde::{Deserialize, Serialize};

use crate::library::models::Song;

/// A named list of songs in insertion order.
///
/// Duplicates are allowed. The name is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    name: String,
    songs: Vec<Song>,
}

impl Playlist {
    /// Creates an empty playlist.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a song to the end of the playlist.
    pub fn add_song(&mut self, song: Song) {
        self.songs.push(song);
    }

    /// Removes the first entry equal to `song`.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed, `false` if the song was not present.
    pub fn remove_song(&mut self, song: &Song) -> bool {
        match self.songs.iter().position(|s| s == song) {
            Some(index) => {
                self.songs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Current contents in order.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::library::{catalog::MusicLibrary, models::Song, playlist::Playlist};

    fn songs() -> Vec<Song> {
        MusicLibrary::demo().songs().to_vec()
    }

    #[test]
    fn test_add_then_remove_scenario() {
        let songs = songs();
        let (a, b) = (songs[0].clone(), songs[1].clone());
        let mut playlist = Playlist::new("P");

        playlist.add_song(a.clone());
        playlist.add_song(b.clone());
        assert!(playlist.remove_song(&a));

        assert_eq!(playlist.songs(), [b]);
        assert_eq!(playlist.name(), "P");
    }

    #[test]
    fn test_remove_takes_first_duplicate_only() {
        let songs = songs();
        let mut playlist = Playlist::new("Repeats");
        playlist.add_song(songs[0].clone());
        playlist.add_song(songs[1].clone());
        playlist.add_song(songs[0].clone());

        playlist.remove_song(&songs[0]);

        assert_eq!(playlist.songs(), [songs[1].clone(), songs[0].clone()]);
    }

    #[test]
    fn test_remove_absent_song_is_noop() {
        let songs = songs();
        let mut playlist = Playlist::new("Empty");

        assert!(!playlist.remove_song(&songs[3]));
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_edit_sequences_match_plain_vec() {
        let songs = songs();
        // Deterministic pseudo-random op stream: (is_add, song index)
        let mut seed: u32 = 0x2545_f491;
        let mut playlist = Playlist::new("Replay");
        let mut model: Vec<Song> = Vec::new();

        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let song = &songs[(seed % 4) as usize];

            if seed % 3 == 0 {
                playlist.remove_song(song);
                if let Some(index) = model.iter().position(|s| s == song) {
                    model.remove(index);
                }
            } else {
                playlist.add_song(song.clone());
                model.push(song.clone());
            }

            assert_eq!(playlist.songs(), model.as_slice());
        }
    }
}
