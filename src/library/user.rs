//! The local user and the playlists they own.

use crate::library::playlist::Playlist;

/// A user with an ordered list of playlists.
///
/// Playlist names are not required to be unique; lookups return the
/// first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    username: String,
    playlists: Vec<Playlist>,
}

impl User {
    /// Creates a user without playlists.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            playlists: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Appends a playlist.
    pub fn add_playlist(&mut self, playlist: Playlist) {
        self.playlists.push(playlist);
    }

    /// Removes the first playlist equal to `playlist` (same name and songs).
    ///
    /// # Returns
    ///
    /// `true` if a playlist was removed.
    pub fn remove_playlist(&mut self, playlist: &Playlist) -> bool {
        match self.playlists.iter().position(|p| p == playlist) {
            Some(index) => {
                self.playlists.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the playlist at `index`.
    pub fn remove_playlist_at(&mut self, index: usize) -> Option<Playlist> {
        (index < self.playlists.len()).then(|| self.playlists.remove(index))
    }

    /// Finds a playlist by name, ignoring case and surrounding whitespace
    /// of the query.
    pub fn find_playlist_by_name(&self, name: &str) -> Option<&Playlist> {
        let needle = name.trim().to_lowercase();
        self.playlists
            .iter()
            .find(|p| p.name().to_lowercase() == needle)
    }

    /// Mutable variant of [`User::find_playlist_by_name`].
    pub fn find_playlist_by_name_mut(&mut self, name: &str) -> Option<&mut Playlist> {
        let needle = name.trim().to_lowercase();
        self.playlists
            .iter_mut()
            .find(|p| p.name().to_lowercase() == needle)
    }

    pub fn playlist(&self, index: usize) -> Option<&Playlist> {
        self.playlists.get(index)
    }

    pub fn playlist_mut(&mut self, index: usize) -> Option<&mut Playlist> {
        self.playlists.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use crate::library::{catalog::MusicLibrary, playlist::Playlist, user::User};

    #[test]
    fn test_find_playlist_is_trimmed_and_case_insensitive() {
        let mut user = User::new("Gogo");
        user.add_playlist(Playlist::new("My Playlist"));
        user.add_playlist(Playlist::new("Road Trip"));

        assert_eq!(
            user.find_playlist_by_name("  road TRIP ").map(Playlist::name),
            Some("Road Trip")
        );
        assert!(user.find_playlist_by_name("Gym").is_none());
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let mut user = User::new("Gogo");
        let mut first = Playlist::new("Mix");
        first.add_song(MusicLibrary::demo().songs()[0].clone());
        user.add_playlist(first.clone());
        user.add_playlist(Playlist::new("mix"));

        assert_eq!(user.playlists().len(), 2);
        assert_eq!(user.find_playlist_by_name("MIX"), Some(&first));
    }

    #[test]
    fn test_remove_playlist_by_value() {
        let mut user = User::new("Gogo");
        let playlist = Playlist::new("Old");
        user.add_playlist(playlist.clone());

        assert!(user.remove_playlist(&playlist));
        assert!(!user.remove_playlist(&playlist));
        assert!(user.playlists().is_empty());
        assert!(user.remove_playlist_at(0).is_none());
    }

    #[test]
    fn test_mutable_lookup_edits_in_place() {
        let mut user = User::new("Gogo");
        user.add_playlist(Playlist::new("Favourites"));
        let song = MusicLibrary::demo().songs()[1].clone();

        if let Some(playlist) = user.find_playlist_by_name_mut("favourites") {
            playlist.add_song(song.clone());
        }

        assert_eq!(user.playlist(0).map(Playlist::len), Some(1));
        assert_eq!(user.username(), "Gogo");
    }
}
