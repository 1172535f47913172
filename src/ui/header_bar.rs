//! Header bar with the playlist switcher.
//!
//! The drop-down lists the user's playlists and selects one of them; the
//! buttons next to it create a new playlist or delete the selected one.

use std::{cell::Cell, rc::Rc};

use {
    libadwaita::{
        HeaderBar as LibadwaitaHeaderBar, WindowTitle,
        glib::MainContext,
        gtk::{Button, DropDown, INVALID_LIST_POSITION, StringList},
        prelude::{ButtonExt, ListModelExt},
    },
    tokio::sync::broadcast::error::RecvError,
    tracing::debug,
};

use crate::{
    state::{AppStateEvent, UserAction},
    ui::application::Dispatcher,
};

/// Basic header bar with playlist controls.
pub struct HeaderBar {
    /// The underlying Libadwaita header bar widget.
    pub widget: LibadwaitaHeaderBar,
    /// Window title and user name.
    pub title: WindowTitle,
    /// Playlist switcher.
    pub playlist_dropdown: DropDown,
    /// Model behind the switcher.
    pub playlist_names: StringList,
    /// Creates a new playlist.
    pub new_button: Button,
    /// Deletes the selected playlist.
    pub delete_button: Button,
    /// Set while the model is rebuilt, so selection changes are not echoed.
    updating: Rc<Cell<bool>>,
}

impl HeaderBar {
    /// Creates the header bar and keeps it in sync with the `AppState`.
    pub fn new(dispatcher: &Dispatcher) -> Self {
        let state = dispatcher.state();
        let widget = LibadwaitaHeaderBar::builder().build();

        let title = WindowTitle::new("Music Library", &state.username());
        widget.set_title_widget(Some(&title));

        let names = state.playlist_names();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let playlist_names = StringList::new(&name_refs);
        let playlist_dropdown = DropDown::builder()
            .model(&playlist_names)
            .selected(u32::try_from(state.selected_index()).unwrap_or(0))
            .tooltip_text("Playlist")
            .build();
        widget.pack_start(&playlist_dropdown);

        let new_button = Button::builder()
            .icon_name("list-add-symbolic")
            .tooltip_text("New playlist")
            .build();
        widget.pack_start(&new_button);

        let delete_button = Button::builder()
            .icon_name("user-trash-symbolic")
            .tooltip_text("Delete playlist")
            .build();
        widget.pack_end(&delete_button);

        let header_bar = Self {
            widget,
            title,
            playlist_dropdown,
            playlist_names,
            new_button,
            delete_button,
            updating: Rc::new(Cell::new(false)),
        };

        header_bar.connect_controls(dispatcher);
        header_bar.subscribe_to_state_changes(dispatcher);

        header_bar
    }

    fn connect_controls(&self, dispatcher: &Dispatcher) {
        let updating = self.updating.clone();
        let select_dispatcher = dispatcher.clone();
        self.playlist_dropdown.connect_selected_notify(move |dropdown| {
            let selected = dropdown.selected();
            if updating.get() || selected == INVALID_LIST_POSITION {
                return;
            }
            select_dispatcher.send(UserAction::SelectPlaylist(selected as usize));
        });

        let new_dispatcher = dispatcher.clone();
        self.new_button
            .connect_clicked(move |_| new_dispatcher.send(UserAction::CreatePlaylist));

        let delete_dispatcher = dispatcher.clone();
        self.delete_button
            .connect_clicked(move |_| delete_dispatcher.send(UserAction::DeleteSelectedPlaylist));
    }

    fn subscribe_to_state_changes(&self, dispatcher: &Dispatcher) {
        let mut receiver = dispatcher.state().subscribe();
        let dropdown = self.playlist_dropdown.clone();
        let names = self.playlist_names.clone();
        let updating = self.updating.clone();

        MainContext::default().spawn_local(async move {
            loop {
                match receiver.recv().await {
                    Ok(AppStateEvent::PlaylistsChanged {
                        names: new_names,
                        selected,
                    }) => {
                        updating.set(true);
                        let refs: Vec<&str> = new_names.iter().map(String::as_str).collect();
                        names.splice(0, names.n_items(), &refs);
                        dropdown.set_selected(u32::try_from(selected).unwrap_or(0));
                        updating.set(false);
                    }
                    Ok(AppStateEvent::SelectedPlaylistUpdated(_)) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "HeaderBar: state events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use libadwaita::{
        ApplicationWindow, init,
        prelude::{ButtonExt, ListModelExt},
    };

    use crate::{
        audio::{
            controller::PlaybackController,
            fake_engine::{EngineProbe, FakeEngine},
            media::MediaRoot,
        },
        library::{MusicLibrary, User},
        state::AppState,
        ui::{application::Dispatcher, header_bar::HeaderBar},
    };

    #[test]
    fn test_header_bar_creation() {
        // Skip this test if we can't initialize GTK (e.g., in CI environments)
        if init().is_err() {
            return;
        }

        let state = AppState::new(MusicLibrary::demo(), User::new("Gogo"), "My Playlist");
        let controller = PlaybackController::new(
            Box::new(FakeEngine::new(Rc::new(EngineProbe::default()), None)),
            MediaRoot::new("."),
            0.7,
        );
        let dispatcher = Dispatcher::new(
            state,
            Rc::new(RefCell::new(controller)),
            ApplicationWindow::builder().build(),
        );

        let header_bar = HeaderBar::new(&dispatcher);

        assert_eq!(header_bar.title.title().as_str(), "Music Library");
        assert_eq!(header_bar.title.subtitle().as_str(), "Gogo");
        assert_eq!(header_bar.playlist_names.n_items(), 1);
        assert_eq!(
            header_bar.playlist_names.string(0).as_deref(),
            Some("My Playlist")
        );
        assert_eq!(header_bar.playlist_dropdown.selected(), 0);
        assert_eq!(
            header_bar.new_button.icon_name().as_deref(),
            Some("list-add-symbolic")
        );
        assert_eq!(
            header_bar.delete_button.icon_name().as_deref(),
            Some("user-trash-symbolic")
        );
    }
}
