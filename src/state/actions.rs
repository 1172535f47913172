//! Routing of shell interactions to state and playback changes.
//!
//! Widgets build a `UserAction` from whatever is selected at the time and
//! hand it to `dispatch`. Every rejected action comes back as a `Notice`;
//! nothing changes in that case.

use std::time::Duration;

use tracing::debug;

use crate::{
    audio::controller::PlaybackController,
    error::{ErrorReporter, Notice, PlaybackError},
    library::Song,
    state::app_state::AppState,
};

const ADD_HINT: &str = "Select a song from the library to add.";
const REMOVE_HINT: &str = "Select a song from the playlist to remove.";
const PLAY_HINT: &str = "Select a song from the library or playlist, then press Play.";

/// Something the user asked the shell to do.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Append the library selection to the selected playlist.
    AddToPlaylist(Option<Song>),
    /// Remove the playlist selection from the selected playlist.
    RemoveFromPlaylist(Option<Song>),
    /// Play a selection. The library selection wins over the playlist's.
    Play {
        library: Option<Song>,
        playlist: Option<Song>,
    },
    Pause,
    Stop,
    /// The progress control was grabbed.
    BeginSeek,
    /// The progress control was released at this many seconds.
    SeekReleased(f64),
    /// The volume control moved, in `[0.0, 1.0]`.
    SetVolume(f64),
    SelectPlaylist(usize),
    CreatePlaylist,
    DeleteSelectedPlaylist,
}

/// Applies `action`.
///
/// # Errors
///
/// Returns the `Notice` to present when the action is rejected: a missing
/// selection, a playback failure, or deleting the last playlist.
pub fn dispatch(
    state: &AppState,
    controller: &mut PlaybackController,
    action: UserAction,
) -> Result<(), Notice> {
    debug!(action = ?action, "Dispatching user action");

    match action {
        UserAction::AddToPlaylist(selection) => {
            let song = selection.ok_or_else(|| Notice::no_selection(ADD_HINT))?;
            state.add_song_to_selected(&song);
            Ok(())
        }
        UserAction::RemoveFromPlaylist(selection) => {
            let song = selection.ok_or_else(|| Notice::no_selection(REMOVE_HINT))?;
            state.remove_song_from_selected(&song);
            Ok(())
        }
        UserAction::Play { library, playlist } => {
            let song = library
                .or(playlist)
                .ok_or_else(|| Notice::no_selection(PLAY_HINT))?;
            report(controller.play(&song))
        }
        UserAction::Pause => report(controller.pause()),
        UserAction::Stop => report(controller.stop()),
        UserAction::BeginSeek => {
            controller.begin_scrub();
            Ok(())
        }
        UserAction::SeekReleased(seconds) => {
            let target = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or_default();
            report(controller.end_scrub(target))
        }
        UserAction::SetVolume(volume) => {
            controller.set_volume(volume.clamp(0.0, 1.0));
            Ok(())
        }
        UserAction::SelectPlaylist(index) => {
            state.select_playlist(index);
            Ok(())
        }
        UserAction::CreatePlaylist => {
            state.create_playlist(&state.next_playlist_name());
            Ok(())
        }
        UserAction::DeleteSelectedPlaylist => {
            if state.delete_selected_playlist() {
                Ok(())
            } else {
                Err(Notice::new(
                    "Cannot delete playlist",
                    "At least one playlist must remain.",
                ))
            }
        }
    }
}

fn report(result: Result<(), PlaybackError>) -> Result<(), Notice> {
    result.map_err(|e| ErrorReporter::notice(&e))
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{create_dir_all, remove_file, write},
        rc::Rc,
    };

    use tempfile::TempDir;

    use crate::{
        audio::{
            controller::{PlaybackController, PlaybackStatus},
            fake_engine::{EngineProbe, FakeEngine},
            media::MediaRoot,
        },
        error::Notice,
        library::{MusicLibrary, Song, User},
        state::{AppState, UserAction, dispatch},
    };

    struct Shell {
        state: AppState,
        controller: PlaybackController,
        songs: Vec<Song>,
        assets: TempDir,
    }

    impl Shell {
        fn new() -> Self {
            let assets = TempDir::new().unwrap();
            let library = MusicLibrary::demo();
            for song in library.songs() {
                let path = assets.path().join(song.file_path());
                create_dir_all(path.parent().unwrap()).unwrap();
                write(path, b"fake").unwrap();
            }

            let engine = FakeEngine::new(Rc::new(EngineProbe::default()), None);
            let controller =
                PlaybackController::new(Box::new(engine), MediaRoot::new(assets.path()), 0.7);
            let songs = library.songs().to_vec();

            Self {
                state: AppState::new(library, User::new("Gogo"), "My Playlist"),
                controller,
                songs,
                assets,
            }
        }

        fn dispatch(&mut self, action: UserAction) -> Result<(), Notice> {
            dispatch(&self.state, &mut self.controller, action)
        }

        fn pump(&mut self) {
            let events = self.controller.engine_events();
            while let Ok(event) = events.try_recv() {
                let _ = self.controller.handle_engine_event(event);
            }
        }
    }

    #[test]
    fn test_missing_selection_notices() {
        let mut shell = Shell::new();

        let add = shell.dispatch(UserAction::AddToPlaylist(None)).unwrap_err();
        assert_eq!(add.title, "No song selected");
        assert_eq!(add.message, "Select a song from the library to add.");

        let remove = shell.dispatch(UserAction::RemoveFromPlaylist(None)).unwrap_err();
        assert_eq!(remove.message, "Select a song from the playlist to remove.");

        let play = shell
            .dispatch(UserAction::Play {
                library: None,
                playlist: None,
            })
            .unwrap_err();
        assert_eq!(
            play.message,
            "Select a song from the library or playlist, then press Play."
        );

        assert!(shell.state.selected_playlist().is_empty());
        assert_eq!(shell.controller.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_add_and_remove_edit_selected_playlist() {
        let mut shell = Shell::new();
        let a = shell.songs[0].clone();
        let b = shell.songs[1].clone();

        shell.dispatch(UserAction::AddToPlaylist(Some(a.clone()))).unwrap();
        shell.dispatch(UserAction::AddToPlaylist(Some(b.clone()))).unwrap();
        shell.dispatch(UserAction::AddToPlaylist(Some(a.clone()))).unwrap();
        shell
            .dispatch(UserAction::RemoveFromPlaylist(Some(a.clone())))
            .unwrap();

        assert_eq!(shell.state.selected_playlist().songs(), &[b, a]);
    }

    #[test]
    fn test_play_prefers_library_selection() {
        let mut shell = Shell::new();
        let library_pick = shell.songs[2].clone();
        let playlist_pick = shell.songs[3].clone();

        shell
            .dispatch(UserAction::Play {
                library: Some(library_pick.clone()),
                playlist: Some(playlist_pick.clone()),
            })
            .unwrap();
        shell.pump();
        assert_eq!(shell.controller.now_playing(), Some(&library_pick));

        shell
            .dispatch(UserAction::Play {
                library: None,
                playlist: Some(playlist_pick.clone()),
            })
            .unwrap();
        shell.pump();
        assert_eq!(shell.controller.now_playing(), Some(&playlist_pick));
        assert_eq!(shell.controller.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_missing_file_becomes_notice() {
        let mut shell = Shell::new();
        let song = shell.songs[1].clone();
        remove_file(shell.assets.path().join(song.file_path())).unwrap();

        let notice = shell
            .dispatch(UserAction::Play {
                library: Some(song),
                playlist: None,
            })
            .unwrap_err();

        assert_eq!(notice.title, "File not found");
        assert!(notice.message.starts_with("Cannot find audio file:\n"));
        assert!(notice.message.contains("preslava_piyan.mp3"));
        assert_eq!(shell.controller.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_transport_and_volume_actions() {
        let mut shell = Shell::new();
        let song = shell.songs[0].clone();

        shell.dispatch(UserAction::Pause).unwrap();
        shell.dispatch(UserAction::Stop).unwrap();
        shell.dispatch(UserAction::SeekReleased(30.0)).unwrap();

        shell
            .dispatch(UserAction::Play {
                library: Some(song),
                playlist: None,
            })
            .unwrap();
        shell.pump();

        shell.dispatch(UserAction::Pause).unwrap();
        assert_eq!(shell.controller.status(), PlaybackStatus::Paused);

        shell.dispatch(UserAction::BeginSeek).unwrap();
        assert!(shell.controller.is_scrubbing());
        shell.dispatch(UserAction::SeekReleased(-4.0)).unwrap();
        assert!(!shell.controller.is_scrubbing());

        shell.dispatch(UserAction::SetVolume(1.4)).unwrap();
        assert_eq!(shell.controller.volume(), 1.0);

        shell.dispatch(UserAction::Stop).unwrap();
        assert_eq!(shell.controller.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn test_playlist_management_actions() {
        let mut shell = Shell::new();

        let refused = shell
            .dispatch(UserAction::DeleteSelectedPlaylist)
            .unwrap_err();
        assert_eq!(refused.title, "Cannot delete playlist");

        shell.dispatch(UserAction::CreatePlaylist).unwrap();
        shell.dispatch(UserAction::CreatePlaylist).unwrap();
        assert_eq!(
            shell.state.playlist_names(),
            vec![
                "My Playlist".to_string(),
                "Playlist 1".to_string(),
                "Playlist 2".to_string(),
            ]
        );

        shell.dispatch(UserAction::SelectPlaylist(0)).unwrap();
        shell.dispatch(UserAction::DeleteSelectedPlaylist).unwrap();
        assert_eq!(shell.state.selected_playlist().name(), "Playlist 1");
    }
}
