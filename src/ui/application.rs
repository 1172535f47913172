//! Main application window.
//!
//! This module implements the `MelodiaApplication`, which loads the
//! catalog, owns the `AppState` and builds the Libadwaita window around a
//! `PlaybackController` driving the native engine.

use std::{cell::RefCell, rc::Rc};

use {
    anyhow::Result as AnyhowResult,
    libadwaita::{
        Application, ApplicationWindow,
        glib::{ExitCode, MainContext, Propagation},
        gtk::{
            Box as GtkBox,
            Orientation::{Horizontal, Vertical},
            Paned,
        },
        prelude::{
            AdwApplicationWindowExt, ApplicationExt, ApplicationExtManual, BoxExt, ButtonExt,
            GtkWindowExt, WidgetExt,
        },
    },
    tracing::{debug, info},
};

use crate::{
    audio::{controller::PlaybackController, media::MediaRoot, native::NativeEngine},
    config::UserSettings,
    error::{ErrorReporter, ResultExt},
    library::{MusicLibrary, User},
    state::{AppState, UserAction, dispatch},
    ui::{
        header_bar::HeaderBar, library_panel::LibraryPanel, notice::present_notice,
        player_bar::PlayerBar, playlist_panel::PlaylistPanel,
    },
};

/// Application id registered with the session bus.
pub const APP_ID: &str = "com.example.melodia";

/// Main application class with window management.
pub struct MelodiaApplication {
    /// The main application instance.
    pub app: Application,
    /// Application state shared with every widget.
    pub app_state: AppState,
    /// Settings read at startup.
    pub settings: UserSettings,
}

impl MelodiaApplication {
    /// Creates the application from startup settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured catalog file cannot be loaded.
    pub fn new(settings: UserSettings) -> AnyhowResult<Self> {
        let library = match &settings.catalog_path {
            Some(path) => MusicLibrary::from_json_file(path, &settings.asset_root_path())
                .add_contextf(format!("Failed to load catalog {path}"))?,
            None => MusicLibrary::demo(),
        };
        info!(songs = library.len(), "Catalog loaded");

        let app_state = AppState::new(
            library,
            User::new(settings.username.clone()),
            &settings.default_playlist_name,
        );

        let app = Application::builder().application_id(APP_ID).build();

        Ok(MelodiaApplication {
            app,
            app_state,
            settings,
        })
    }

    /// Runs the GTK main loop until the window is closed.
    pub fn run(&self) -> ExitCode {
        self.app.connect_activate({
            let app_state = self.app_state.clone();
            let settings = self.settings.clone();

            move |app| build_ui(app, &app_state, &settings)
        });

        self.app.run_with_args::<&str>(&[])
    }
}

/// Routes widget interactions through `dispatch` and shows the resulting
/// notices.
#[derive(Clone)]
pub struct Dispatcher {
    state: AppState,
    controller: Rc<RefCell<PlaybackController>>,
    window: ApplicationWindow,
}

impl Dispatcher {
    pub fn new(
        state: AppState,
        controller: Rc<RefCell<PlaybackController>>,
        window: ApplicationWindow,
    ) -> Self {
        Self {
            state,
            controller,
            window,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn controller(&self) -> &Rc<RefCell<PlaybackController>> {
        &self.controller
    }

    /// Applies `action`, presenting a notice if it is rejected.
    pub fn send(&self, action: UserAction) {
        let result = match self.controller.try_borrow_mut() {
            Ok(mut controller) => dispatch(&self.state, &mut controller, action),
            Err(_) => {
                debug!(action = ?action, "Controller busy, dropping action");
                return;
            }
        };

        if let Err(notice) = result {
            present_notice(&self.window, &notice);
        }
    }
}

/// Builds the main user interface.
fn build_ui(app: &Application, app_state: &AppState, settings: &UserSettings) {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("Music Library")
        .default_width(960)
        .default_height(600)
        .build();

    let controller = Rc::new(RefCell::new(PlaybackController::new(
        Box::new(NativeEngine::new()),
        MediaRoot::new(settings.asset_root_path()),
        settings.initial_volume,
    )));
    let dispatcher = Dispatcher::new(app_state.clone(), controller.clone(), window.clone());

    forward_engine_events(&controller, &window);

    let header_bar = HeaderBar::new(&dispatcher);
    let library_panel = LibraryPanel::new(app_state.library());
    let playlist_panel = PlaylistPanel::new(app_state);
    let player_bar = PlayerBar::new(&dispatcher, settings);

    library_panel.add_button.connect_clicked({
        let dispatcher = dispatcher.clone();
        let library_panel = library_panel.clone();
        move |_| dispatcher.send(UserAction::AddToPlaylist(library_panel.selected_song()))
    });

    playlist_panel.remove_button.connect_clicked({
        let dispatcher = dispatcher.clone();
        let playlist_panel = playlist_panel.clone();
        move |_| dispatcher.send(UserAction::RemoveFromPlaylist(playlist_panel.selected_song()))
    });

    player_bar.play_button.connect_clicked({
        let dispatcher = dispatcher.clone();
        let library_panel = library_panel.clone();
        let playlist_panel = playlist_panel.clone();
        move |_| {
            dispatcher.send(UserAction::Play {
                library: library_panel.selected_song(),
                playlist: playlist_panel.selected_song(),
            });
        }
    });

    let panes = Paned::builder()
        .orientation(Horizontal)
        .start_child(&library_panel.widget)
        .end_child(&playlist_panel.widget)
        .resize_start_child(true)
        .resize_end_child(true)
        .vexpand(true)
        .build();

    let main_box = GtkBox::builder().orientation(Vertical).build();
    main_box.append(&header_bar.widget);
    main_box.append(&panes);
    main_box.append(&player_bar.widget);

    window.connect_close_request(move |_| {
        if let Ok(mut controller) = controller.try_borrow_mut() {
            controller.shutdown();
        }
        Propagation::Proceed
    });

    window.set_content(Some(&main_box));
    window.present();
}

/// Feeds engine events to the controller on the UI thread.
fn forward_engine_events(controller: &Rc<RefCell<PlaybackController>>, window: &ApplicationWindow) {
    let receiver = controller.borrow().engine_events();
    let controller = Rc::downgrade(controller);
    let window = window.clone();

    MainContext::default().spawn_local(async move {
        while let Ok(event) = receiver.recv().await {
            let Some(controller) = controller.upgrade() else {
                break;
            };
            let result = controller.borrow_mut().handle_engine_event(event);
            if let Err(e) = result {
                present_notice(&window, &ErrorReporter::notice(&e));
            }
        }
        debug!("Engine event forwarding stopped");
    });
}
