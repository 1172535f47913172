//! Application state shared by the shell's widgets.
//!
//! `AppState` owns the catalog, the local user and the index of the
//! selected playlist. Every mutation is broadcast as an `AppStateEvent` so
//! panels can refresh without holding references to each other.

use std::sync::Arc;

use {
    parking_lot::RwLock,
    tokio::sync::broadcast::{Receiver, Sender, channel},
    tracing::{debug, info},
};

use crate::library::{MusicLibrary, Playlist, Song, User};

/// Central state container with thread-safe access.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The read-only catalog.
    library: Arc<MusicLibrary>,
    /// The local user and their playlists.
    user: Arc<RwLock<User>>,
    /// Index of the selected playlist. Always valid.
    selected: Arc<RwLock<usize>>,
    /// Broadcast channel for state change notifications.
    state_tx: Sender<AppStateEvent>,
}

/// Application state change events.
#[derive(Debug, Clone, PartialEq)]
pub enum AppStateEvent {
    /// Playlists were added, removed or reselected.
    PlaylistsChanged {
        /// Names in display order.
        names: Vec<String>,
        /// Index of the selected playlist.
        selected: usize,
    },
    /// Contents of the selected playlist changed.
    SelectedPlaylistUpdated(Playlist),
}

impl AppState {
    /// Creates the application state.
    ///
    /// # Arguments
    ///
    /// * `library` - The catalog.
    /// * `user` - The local user.
    /// * `default_playlist_name` - Name of the playlist created when `user`
    ///   has none.
    pub fn new(library: MusicLibrary, mut user: User, default_playlist_name: &str) -> Self {
        if user.playlists().is_empty() {
            user.add_playlist(Playlist::new(default_playlist_name));
        }

        let (state_tx, _) = channel(16);

        Self {
            library: Arc::new(library),
            user: Arc::new(RwLock::new(user)),
            selected: Arc::new(RwLock::new(0)),
            state_tx,
        }
    }

    pub fn library(&self) -> &MusicLibrary {
        &self.library
    }

    pub fn username(&self) -> String {
        self.user.read().username().to_string()
    }

    pub fn playlist_names(&self) -> Vec<String> {
        self.user
            .read()
            .playlists()
            .iter()
            .map(|playlist| playlist.name().to_string())
            .collect()
    }

    pub fn selected_index(&self) -> usize {
        *self.selected.read()
    }

    /// Snapshot of the selected playlist.
    pub fn selected_playlist(&self) -> Playlist {
        let index = self.selected_index();
        self.user
            .read()
            .playlist(index)
            .cloned()
            .unwrap_or_else(|| Playlist::new(""))
    }

    /// Selects the playlist at `index`.
    ///
    /// # Returns
    ///
    /// `false` if `index` is out of range.
    pub fn select_playlist(&self, index: usize) -> bool {
        if index >= self.user.read().playlists().len() {
            return false;
        }
        if index == self.selected_index() {
            return true;
        }

        *self.selected.write() = index;
        debug!(index, "Selected playlist");
        self.publish_playlists();
        self.publish_selected();
        true
    }

    /// Adds an empty playlist and selects it.
    pub fn create_playlist(&self, name: &str) {
        let index = {
            let mut user = self.user.write();
            user.add_playlist(Playlist::new(name));
            user.playlists().len() - 1
        };
        *self.selected.write() = index;

        info!(name, "Created playlist");
        self.publish_playlists();
        self.publish_selected();
    }

    /// First `Playlist {n}` name not already taken, counting from 1.
    pub fn next_playlist_name(&self) -> String {
        let user = self.user.read();
        (1..)
            .map(|n| format!("Playlist {n}"))
            .find(|name| user.find_playlist_by_name(name).is_none())
            .unwrap_or_default()
    }

    /// Deletes the selected playlist and selects its neighbour.
    ///
    /// # Returns
    ///
    /// `false` when it is the only playlist, which is kept.
    pub fn delete_selected_playlist(&self) -> bool {
        let index = self.selected_index();
        let removed = {
            let mut user = self.user.write();
            if user.playlists().len() <= 1 {
                return false;
            }
            let removed = user.remove_playlist_at(index);
            *self.selected.write() = index.min(user.playlists().len() - 1);
            removed
        };

        if let Some(playlist) = removed {
            info!(name = playlist.name(), "Deleted playlist");
        }
        self.publish_playlists();
        self.publish_selected();
        true
    }

    /// Appends `song` to the selected playlist.
    ///
    /// # Returns
    ///
    /// `false` if `song` is not part of the catalog.
    pub fn add_song_to_selected(&self, song: &Song) -> bool {
        if !self.library.contains(song) {
            debug!(song = %song, "Rejected song outside the catalog");
            return false;
        }

        let index = self.selected_index();
        if let Some(playlist) = self.user.write().playlist_mut(index) {
            playlist.add_song(song.clone());
        }
        self.publish_selected();
        true
    }

    /// Removes the first occurrence of `song` from the selected playlist.
    pub fn remove_song_from_selected(&self, song: &Song) -> bool {
        let index = self.selected_index();
        let removed = self
            .user
            .write()
            .playlist_mut(index)
            .is_some_and(|playlist| playlist.remove_song(song));

        if removed {
            self.publish_selected();
        }
        removed
    }

    /// Subscribes to application state changes.
    pub fn subscribe(&self) -> Receiver<AppStateEvent> {
        self.state_tx.subscribe()
    }

    fn publish_playlists(&self) {
        let _ = self.state_tx.send(AppStateEvent::PlaylistsChanged {
            names: self.playlist_names(),
            selected: self.selected_index(),
        });
    }

    fn publish_selected(&self) {
        let _ = self
            .state_tx
            .send(AppStateEvent::SelectedPlaylistUpdated(self.selected_playlist()));
    }
}
