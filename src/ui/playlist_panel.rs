//! Contents of the selected playlist with the "Remove" action.

use std::{cell::RefCell, rc::Rc};

use {
    libadwaita::{
        glib::MainContext,
        gtk::{
            Align::Start, Box, Button, Label, ListBox, Orientation::Vertical, ScrolledWindow,
            SelectionMode::Single,
        },
        prelude::{BoxExt, ListBoxRowExt, WidgetExt},
    },
    tokio::sync::broadcast::error::RecvError,
    tracing::debug,
};

use crate::{
    library::{Playlist, Song},
    state::{AppState, AppStateEvent},
    ui::library_panel::song_row,
};

/// The right-hand panel: songs of the selected playlist.
#[derive(Clone)]
pub struct PlaylistPanel {
    /// Panel container.
    pub widget: Box,
    /// Name of the selected playlist.
    pub heading: Label,
    /// Song rows in playlist order.
    pub list_box: ListBox,
    /// Removes the selected song from the playlist.
    pub remove_button: Button,
    songs: Rc<RefCell<Vec<Song>>>,
}

impl PlaylistPanel {
    /// Creates the panel and follows playlist changes in `state`.
    pub fn new(state: &AppState) -> Self {
        let widget = Box::builder()
            .orientation(Vertical)
            .spacing(6)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(6)
            .margin_end(12)
            .hexpand(true)
            .build();

        let heading = Label::builder()
            .halign(Start)
            .css_classes(["heading"])
            .build();
        widget.append(&heading);

        let list_box = ListBox::builder()
            .selection_mode(Single)
            .css_classes(["boxed-list"])
            .build();
        let scrolled = ScrolledWindow::builder()
            .child(&list_box)
            .vexpand(true)
            .build();
        widget.append(&scrolled);

        let remove_button = Button::builder()
            .label("Remove from playlist")
            .halign(Start)
            .build();
        widget.append(&remove_button);

        let panel = Self {
            widget,
            heading,
            list_box,
            remove_button,
            songs: Rc::new(RefCell::new(Vec::new())),
        };
        panel.show_playlist(&state.selected_playlist());
        panel.subscribe_to_state_changes(state);

        panel
    }

    /// The song on the selected row, if any.
    pub fn selected_song(&self) -> Option<Song> {
        let row = self.list_box.selected_row()?;
        let index = usize::try_from(row.index()).ok()?;
        self.songs.borrow().get(index).cloned()
    }

    /// Replaces the rows with the songs of `playlist`.
    pub fn show_playlist(&self, playlist: &Playlist) {
        self.heading.set_label(playlist.name());

        while let Some(child) = self.list_box.first_child() {
            self.list_box.remove(&child);
        }
        for song in playlist.songs() {
            self.list_box.append(&song_row(song));
        }

        *self.songs.borrow_mut() = playlist.songs().to_vec();
    }

    fn subscribe_to_state_changes(&self, state: &AppState) {
        let mut receiver = state.subscribe();
        let panel = self.clone();

        MainContext::default().spawn_local(async move {
            loop {
                match receiver.recv().await {
                    Ok(AppStateEvent::SelectedPlaylistUpdated(playlist)) => {
                        panel.show_playlist(&playlist);
                    }
                    Ok(AppStateEvent::PlaylistsChanged { .. }) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "PlaylistPanel: state events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}
