//! Catalog list with the "Add to playlist" action.

use std::rc::Rc;

use libadwaita::{
    gtk::{
        Align::Start, Box, Button, Label, ListBox, ListBoxRow, Orientation::Vertical,
        ScrolledWindow, SelectionMode::Single, pango::EllipsizeMode::End,
    },
    prelude::{BoxExt, ListBoxRowExt},
};

use crate::library::{MusicLibrary, Song};

/// The left-hand panel: every catalog song, one per row.
#[derive(Clone)]
pub struct LibraryPanel {
    /// Panel container.
    pub widget: Box,
    /// Song rows in catalog order.
    pub list_box: ListBox,
    /// Appends the selected song to the selected playlist.
    pub add_button: Button,
    songs: Rc<Vec<Song>>,
}

impl LibraryPanel {
    pub fn new(library: &MusicLibrary) -> Self {
        let widget = Box::builder()
            .orientation(Vertical)
            .spacing(6)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(6)
            .hexpand(true)
            .build();

        let heading = Label::builder()
            .label("Library")
            .halign(Start)
            .css_classes(["heading"])
            .build();
        widget.append(&heading);

        let list_box = ListBox::builder()
            .selection_mode(Single)
            .css_classes(["boxed-list"])
            .build();
        for song in library.songs() {
            list_box.append(&song_row(song));
        }

        let scrolled = ScrolledWindow::builder()
            .child(&list_box)
            .vexpand(true)
            .build();
        widget.append(&scrolled);

        let add_button = Button::builder()
            .label("Add to playlist")
            .halign(Start)
            .build();
        widget.append(&add_button);

        Self {
            widget,
            list_box,
            add_button,
            songs: Rc::new(library.songs().to_vec()),
        }
    }

    /// The song on the selected row, if any.
    pub fn selected_song(&self) -> Option<Song> {
        let row = self.list_box.selected_row()?;
        let index = usize::try_from(row.index()).ok()?;
        self.songs.get(index).cloned()
    }
}

/// A selectable row showing `title — artist`.
pub(crate) fn song_row(song: &Song) -> ListBoxRow {
    let label = Label::builder()
        .label(song.to_string())
        .halign(Start)
        .xalign(0.0)
        .ellipsize(End)
        .tooltip_text(song.to_string())
        .margin_top(6)
        .margin_bottom(6)
        .margin_start(8)
        .margin_end(8)
        .build();

    let row = ListBoxRow::new();
    row.set_child(Some(&label));
    row.set_selectable(true);
    row
}
