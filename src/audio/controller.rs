//! Playback orchestration over a single engine session.
//!
//! The `PlaybackController` owns the one live `EngineSession`, tracks
//! the current song and volume, and turns user requests and engine events
//! into state transitions. Every transition is published to subscribers
//! as a `PlaybackEvent` so the shell can update its widgets.
//!
//! The controller is single-threaded: it lives on the UI thread and engine
//! events are handed to it through `handle_engine_event`, which the shell
//! calls after draining the channel returned by `engine_events`.

use std::{mem::replace, time::Duration};

use {
    async_channel::{Receiver, Sender, unbounded},
    tracing::{debug, info, warn},
};

use crate::{
    audio::{
        engine::{EngineEvent, EngineEventKind, EngineSession, MediaEngine, SessionId},
        media::MediaRoot,
        progress::ProgressReport,
    },
    error::{AudioError, PlaybackError},
    library::models::Song,
};

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No media loaded.
    Idle,
    /// Media handed to the engine, waiting for its ready signal.
    Loading,
    /// Media is playing.
    Playing,
    /// Media is paused at its current position.
    Paused,
    /// Media is loaded and rewound to the start.
    Stopped,
}

impl PlaybackStatus {
    /// Whether the progress tick runs in this state.
    #[must_use]
    pub fn is_ticking(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    /// Whether the session is ready, so seeking is honored.
    #[must_use]
    pub fn is_seekable(self) -> bool {
        matches!(self, Self::Playing | Self::Paused | Self::Stopped)
    }
}

/// Notifications published by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// The playback state changed.
    StatusChanged(PlaybackStatus),
    /// The song bound to the live session changed.
    NowPlaying(Option<Song>),
    /// The engine finished loading the current song.
    Ready {
        /// Total length, if known.
        duration: Option<Duration>,
    },
    /// New position and duration to display.
    Progress(ProgressReport),
}

/// Owning handle to an engine session.
///
/// Dropping the guard stops and disposes the session. Failures during that
/// release are logged and discarded.
struct SessionGuard {
    id: SessionId,
    session: Option<Box<dyn EngineSession>>,
}

impl SessionGuard {
    fn new(id: SessionId, session: Box<dyn EngineSession>) -> Self {
        Self {
            id,
            session: Some(session),
        }
    }

    fn session(&self) -> Option<&dyn EngineSession> {
        self.session.as_deref()
    }

    fn session_mut(&mut self) -> Option<&mut (dyn EngineSession + 'static)> {
        self.session.as_deref_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if let Err(e) = session.stop() {
            debug!(session = %self.id, error = %e, "Ignoring stop failure during release");
        }
        if let Err(e) = session.dispose() {
            debug!(session = %self.id, error = %e, "Ignoring dispose failure during release");
        }
        debug!(session = %self.id, "Released engine session");
    }
}

/// The song and engine session currently bound to the slot.
struct LiveSession {
    song: Song,
    handle: SessionGuard,
    /// Start playing as soon as the engine signals ready.
    autoplay: bool,
}

/// The single playback slot.
enum Slot {
    Idle,
    Loading(LiveSession),
    Playing(LiveSession),
    Paused(LiveSession),
    Stopped(LiveSession),
}

impl Slot {
    fn status(&self) -> PlaybackStatus {
        match self {
            Self::Idle => PlaybackStatus::Idle,
            Self::Loading(_) => PlaybackStatus::Loading,
            Self::Playing(_) => PlaybackStatus::Playing,
            Self::Paused(_) => PlaybackStatus::Paused,
            Self::Stopped(_) => PlaybackStatus::Stopped,
        }
    }

    fn live(&self) -> Option<&LiveSession> {
        match self {
            Self::Idle => None,
            Self::Loading(live) | Self::Playing(live) | Self::Paused(live) | Self::Stopped(live) => {
                Some(live)
            }
        }
    }

    fn live_mut(&mut self) -> Option<&mut LiveSession> {
        match self {
            Self::Idle => None,
            Self::Loading(live) | Self::Playing(live) | Self::Paused(live) | Self::Stopped(live) => {
                Some(live)
            }
        }
    }

    fn into_live(self) -> Option<LiveSession> {
        match self {
            Self::Idle => None,
            Self::Loading(live) | Self::Playing(live) | Self::Paused(live) | Self::Stopped(live) => {
                Some(live)
            }
        }
    }

    /// Rebinds a live session under a new state. `Idle` releases it.
    fn with_status(live: LiveSession, status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Idle => Self::Idle,
            PlaybackStatus::Loading => Self::Loading(live),
            PlaybackStatus::Playing => Self::Playing(live),
            PlaybackStatus::Paused => Self::Paused(live),
            PlaybackStatus::Stopped => Self::Stopped(live),
        }
    }
}

/// Drives one engine session at a time on behalf of the shell.
pub struct PlaybackController {
    /// Factory for new sessions.
    engine: Box<dyn MediaEngine>,
    /// Where song paths are resolved.
    media_root: MediaRoot,
    /// Current session, tagged with its state.
    slot: Slot,
    /// Volume applied to every session, in `[0.0, 1.0]`.
    volume: f64,
    /// Next session id to hand out.
    next_session: u64,
    /// Set while the user drags the progress control.
    scrubbing: bool,
    /// Sender cloned into every opened session.
    engine_tx: Sender<EngineEvent>,
    /// Receiving end drained by the shell.
    engine_rx: Receiver<EngineEvent>,
    /// Subscribers for playback events.
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl PlaybackController {
    /// Creates an idle controller.
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine used to open sessions.
    /// * `media_root` - Directory song paths resolve against.
    /// * `initial_volume` - Volume for the first session.
    pub fn new(engine: Box<dyn MediaEngine>, media_root: MediaRoot, initial_volume: f64) -> Self {
        let (engine_tx, engine_rx) = unbounded();

        Self {
            engine,
            media_root,
            slot: Slot::Idle,
            volume: initial_volume,
            next_session: 1,
            scrubbing: false,
            engine_tx,
            engine_rx,
            subscribers: Vec::new(),
        }
    }

    /// Receiver for engine events. The shell forwards each one to
    /// [`PlaybackController::handle_engine_event`].
    #[must_use]
    pub fn engine_events(&self) -> Receiver<EngineEvent> {
        self.engine_rx.clone()
    }

    /// Subscribes to playback events.
    ///
    /// # Returns
    ///
    /// A receiver that gets the current status immediately, then every
    /// subsequent event.
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        let _ = tx.try_send(PlaybackEvent::StatusChanged(self.status()));
        self.subscribers.push(tx);
        rx
    }

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.slot.status()
    }

    /// Song bound to the live session, if any.
    #[must_use]
    pub fn now_playing(&self) -> Option<&Song> {
        self.slot.live().map(|live| &live.song)
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Id of the live session, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.slot.live().map(|live| live.handle.id)
    }

    #[must_use]
    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Current position and duration.
    ///
    /// Without a ready session the report is `00:00 / 00:00`.
    #[must_use]
    pub fn progress(&self) -> ProgressReport {
        if !self.status().is_seekable() {
            return ProgressReport::default();
        }

        self.slot
            .live()
            .and_then(|live| live.handle.session())
            .map(|session| ProgressReport::new(session.position(), session.duration()))
            .unwrap_or_default()
    }

    /// Plays `song`.
    ///
    /// If `song` is the current song and playback is paused, the existing
    /// session resumes. Otherwise the media path is resolved, the current
    /// session is released, and a new session is opened in `Loading`.
    /// Playback starts when the engine reports ready.
    ///
    /// # Errors
    ///
    /// * `PlaybackError::MediaNotFound` if the file does not exist. Nothing
    ///   changes in that case.
    /// * `PlaybackError::Engine` if the engine cannot open the file. The
    ///   controller is `Idle` afterwards.
    pub fn play(&mut self, song: &Song) -> Result<(), PlaybackError> {
        if matches!(&self.slot, Slot::Paused(live) if live.song == *song) {
            debug!(song = %song, "Resuming paused session");
            self.drive(|session| session.play())?;
            self.retag(PlaybackStatus::Playing);
            return Ok(());
        }

        let path = self.media_root.resolve(song.file_path())?;

        self.release();

        let id = SessionId(self.next_session);
        self.next_session += 1;
        info!(song = %song, session = %id, "Loading media");

        let mut session = match self.engine.open(&path, id, self.engine_tx.clone()) {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e)),
        };
        session.set_volume(self.volume);

        self.slot = Slot::Loading(LiveSession {
            song: song.clone(),
            handle: SessionGuard::new(id, session),
            autoplay: true,
        });
        self.notify(PlaybackEvent::NowPlaying(Some(song.clone())));
        self.notify(PlaybackEvent::StatusChanged(PlaybackStatus::Loading));

        Ok(())
    }

    /// Pauses playback. Does nothing unless playing.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Engine` if the engine fails; the session is
    /// released.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.status() != PlaybackStatus::Playing {
            return Ok(());
        }

        self.drive(|session| session.pause())?;
        self.retag(PlaybackStatus::Paused);
        Ok(())
    }

    /// Stops playback and rewinds to the start.
    ///
    /// While loading, this cancels the pending start so the session lands
    /// in `Stopped` once ready. Does nothing when idle.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Engine` if the engine fails; the session is
    /// released.
    pub fn stop(&mut self) -> Result<(), PlaybackError> {
        match self.status() {
            PlaybackStatus::Idle => Ok(()),
            PlaybackStatus::Loading => {
                if let Slot::Loading(live) = &mut self.slot {
                    live.autoplay = false;
                }
                debug!("Stop requested while loading, start cancelled");
                Ok(())
            }
            PlaybackStatus::Playing | PlaybackStatus::Paused | PlaybackStatus::Stopped => {
                self.drive(|session| session.stop())?;
                self.retag(PlaybackStatus::Stopped);
                let report = ProgressReport::new(Duration::ZERO, self.live_duration());
                self.notify(PlaybackEvent::Progress(report));
                Ok(())
            }
        }
    }

    /// Seeks within the current media.
    ///
    /// Ignored while idle or loading. The target is clamped to the known
    /// duration.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Engine` if the engine fails; the session is
    /// released.
    pub fn seek(&mut self, target: Duration) -> Result<(), PlaybackError> {
        if !self.status().is_seekable() {
            debug!(target = ?target, "Ignoring seek without a ready session");
            return Ok(());
        }

        let target = self.live_duration().map_or(target, |d| target.min(d));
        self.drive(|session| session.seek(target))?;

        let report = self.progress();
        self.notify(PlaybackEvent::Progress(report));
        Ok(())
    }

    /// Sets the volume for the live session and every later one.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        if let Some(session) = self
            .slot
            .live_mut()
            .and_then(|live| live.handle.session_mut())
        {
            session.set_volume(volume);
        }
    }

    /// Marks the start of a progress-control drag. Ticks are suppressed
    /// until [`PlaybackController::end_scrub`].
    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    /// Ends a drag and seeks to where it was released.
    ///
    /// # Errors
    ///
    /// Same as [`PlaybackController::seek`].
    pub fn end_scrub(&mut self, target: Duration) -> Result<(), PlaybackError> {
        self.scrubbing = false;
        self.seek(target)
    }

    /// Periodic progress refresh.
    ///
    /// # Returns
    ///
    /// The report published to subscribers, or `None` when not playing or
    /// paused, or while a drag is in progress.
    pub fn tick(&mut self) -> Option<ProgressReport> {
        if self.scrubbing || !self.status().is_ticking() {
            return None;
        }

        let report = self.progress();
        self.notify(PlaybackEvent::Progress(report));
        Some(report)
    }

    /// Applies an event reported by the engine.
    ///
    /// Events from sessions other than the live one are dropped.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Engine` when the event is a failure, or the
    /// engine fails to start after becoming ready. The controller is
    /// `Idle` afterwards.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Result<(), PlaybackError> {
        if self.session_id() != Some(event.session) {
            debug!(session = %event.session, "Dropping event from released session");
            return Ok(());
        }

        match event.kind {
            EngineEventKind::Ready => self.on_ready(),
            EngineEventKind::EndOfMedia => {
                info!(session = %event.session, "End of media");
                self.stop()
            }
            EngineEventKind::Failed(reason) => Err(self.fail(AudioError::EngineFailure(reason))),
        }
    }

    /// Releases the live session and returns to `Idle`.
    pub fn shutdown(&mut self) {
        if self.status() != PlaybackStatus::Idle {
            info!("Shutting down playback");
            self.enter_idle();
        }
    }

    fn on_ready(&mut self) -> Result<(), PlaybackError> {
        let autoplay = match &self.slot {
            Slot::Loading(live) => live.autoplay,
            _ => {
                debug!("Ignoring ready signal outside of loading");
                return Ok(());
            }
        };

        let duration = self.live_duration();
        self.notify(PlaybackEvent::Ready { duration });

        if autoplay {
            self.drive(|session| session.play())?;
            self.retag(PlaybackStatus::Playing);
        } else {
            self.retag(PlaybackStatus::Stopped);
        }

        self.notify(PlaybackEvent::Progress(ProgressReport::new(
            Duration::ZERO,
            duration,
        )));
        Ok(())
    }

    /// Runs a transport operation on the live session. Failures release
    /// the session.
    fn drive(
        &mut self,
        operation: impl FnOnce(&mut dyn EngineSession) -> Result<(), AudioError>,
    ) -> Result<(), PlaybackError> {
        let result = match self.slot.live_mut() {
            Some(live) => match live.handle.session_mut() {
                Some(session) => operation(session),
                None => Err(AudioError::SessionClosed),
            },
            None => return Ok(()),
        };

        result.map_err(|e| self.fail(e))
    }

    fn live_duration(&self) -> Option<Duration> {
        self.slot
            .live()
            .and_then(|live| live.handle.session())
            .and_then(|session| session.duration())
    }

    /// Moves the live session to a new state and publishes it.
    fn retag(&mut self, status: PlaybackStatus) {
        let slot = replace(&mut self.slot, Slot::Idle);
        self.slot = match slot.into_live() {
            Some(live) => Slot::with_status(live, status),
            None => Slot::Idle,
        };

        debug!(status = ?self.slot.status(), "Playback status changed");
        self.notify(PlaybackEvent::StatusChanged(self.slot.status()));
    }

    /// Drops the live session without publishing anything.
    fn release(&mut self) {
        drop(replace(&mut self.slot, Slot::Idle));
    }

    /// Releases the live session and publishes the idle state.
    fn enter_idle(&mut self) {
        self.release();
        self.scrubbing = false;
        self.notify(PlaybackEvent::NowPlaying(None));
        self.notify(PlaybackEvent::StatusChanged(PlaybackStatus::Idle));
        self.notify(PlaybackEvent::Progress(ProgressReport::default()));
    }

    fn fail(&mut self, error: AudioError) -> PlaybackError {
        warn!(error = %error, "Engine failure, releasing session");
        self.enter_idle();
        PlaybackError::Engine(error)
    }

    fn notify(&mut self, event: PlaybackEvent) {
        self.subscribers
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }
}
