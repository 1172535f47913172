//! Audio engine collaborator interface.
//!
//! The playback controller never talks to a decoder or device directly.
//! It opens one `EngineSession` at a time through a `MediaEngine` and
//! learns about asynchronous readiness, end of media and failures through
//! `EngineEvent`s delivered on an `async_channel`.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    time::Duration,
};

use async_channel::Sender;

use crate::error::AudioError;

/// Identity of one engine session.
///
/// Ids are allocated by the controller and never reused, so events that
/// outlive their session can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}

/// What happened to an engine session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    /// Media is loaded; duration and seeking are available.
    Ready,
    /// Playback ran past the last sample.
    EndOfMedia,
    /// The engine gave up on the session.
    Failed(String),
}

/// An asynchronous notification from an engine session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Session that produced the event.
    pub session: SessionId,
    /// Event payload.
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn ready(session: SessionId) -> Self {
        Self {
            session,
            kind: EngineEventKind::Ready,
        }
    }

    pub fn end_of_media(session: SessionId) -> Self {
        Self {
            session,
            kind: EngineEventKind::EndOfMedia,
        }
    }

    pub fn failed(session: SessionId, reason: impl Into<String>) -> Self {
        Self {
            session,
            kind: EngineEventKind::Failed(reason.into()),
        }
    }
}

/// Factory for engine sessions.
pub trait MediaEngine {
    /// Loads a media file into a new, paused session.
    ///
    /// The session must eventually emit `Ready` (or `Failed`) on `events`
    /// tagged with `id`.
    ///
    /// # Arguments
    ///
    /// * `path` - Existing, readable media file.
    /// * `id` - Identity to stamp on every event of this session.
    /// * `events` - Channel the session reports on.
    ///
    /// # Errors
    ///
    /// Returns `AudioError` if the file cannot be decoded or no output is
    /// available.
    fn open(
        &mut self,
        path: &Path,
        id: SessionId,
        events: Sender<EngineEvent>,
    ) -> Result<Box<dyn EngineSession>, AudioError>;
}

/// One loaded media resource with transport controls.
pub trait EngineSession {
    /// Starts or resumes output.
    fn play(&mut self) -> Result<(), AudioError>;

    /// Halts output, keeping the position.
    fn pause(&mut self) -> Result<(), AudioError>;

    /// Halts output and rewinds to the start.
    fn stop(&mut self) -> Result<(), AudioError>;

    /// Moves the playback position.
    fn seek(&mut self, position: Duration) -> Result<(), AudioError>;

    /// Sets the output gain in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f64);

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Total length, if the container reports one.
    fn duration(&self) -> Option<Duration>;

    /// Releases native resources. The session is unusable afterwards.
    fn dispose(self: Box<Self>) -> Result<(), AudioError>;
}

#[cfg(test)]
mod tests {
    use crate::audio::engine::{EngineEvent, EngineEventKind, SessionId};

    #[test]
    fn test_event_constructors() {
        let id = SessionId(7);

        assert_eq!(EngineEvent::ready(id).kind, EngineEventKind::Ready);
        assert_eq!(EngineEvent::end_of_media(id).session, id);
        assert_eq!(
            EngineEvent::failed(id, "device lost").kind,
            EngineEventKind::Failed("device lost".to_string())
        );
        assert_eq!(id.to_string(), "#7");
    }
}
