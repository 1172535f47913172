//! In-memory engine for controller and routing tests.
//!
//! Sessions never touch a device. Their observable effects (open and
//! dispose counts, live-session concurrency, transport state, position,
//! volume) are recorded on a shared `EngineProbe`.

use std::{cell::Cell, path::Path, rc::Rc, time::Duration};

use async_channel::Sender;

use crate::{
    audio::engine::{EngineEvent, EngineSession, MediaEngine, SessionId},
    error::AudioError,
};

/// Shared record of everything the fake engine did.
#[derive(Debug, Default)]
pub struct EngineProbe {
    pub opened: Cell<usize>,
    pub disposed: Cell<usize>,
    pub live: Cell<usize>,
    pub max_live: Cell<usize>,
    pub playing: Cell<bool>,
    pub position: Cell<Duration>,
    pub volume: Cell<f64>,
    pub fail_open: Cell<bool>,
    pub fail_play: Cell<bool>,
    pub fail_dispose: Cell<bool>,
}

/// Engine whose sessions become ready immediately.
pub struct FakeEngine {
    probe: Rc<EngineProbe>,
    duration: Option<Duration>,
}

impl FakeEngine {
    pub fn new(probe: Rc<EngineProbe>, duration: Option<Duration>) -> Self {
        Self { probe, duration }
    }
}

impl MediaEngine for FakeEngine {
    fn open(
        &mut self,
        _path: &Path,
        id: SessionId,
        events: Sender<EngineEvent>,
    ) -> Result<Box<dyn EngineSession>, AudioError> {
        if self.probe.fail_open.get() {
            return Err(AudioError::InvalidOperation {
                reason: "unsupported codec".to_string(),
            });
        }

        let probe = &self.probe;
        probe.opened.set(probe.opened.get() + 1);
        probe.live.set(probe.live.get() + 1);
        probe.max_live.set(probe.max_live.get().max(probe.live.get()));
        probe.playing.set(false);
        probe.position.set(Duration::ZERO);

        let _ = events.try_send(EngineEvent::ready(id));

        Ok(Box::new(FakeSession {
            probe: Rc::clone(&self.probe),
            duration: self.duration,
        }))
    }
}

struct FakeSession {
    probe: Rc<EngineProbe>,
    duration: Option<Duration>,
}

impl EngineSession for FakeSession {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.probe.fail_play.get() {
            return Err(AudioError::EngineFailure("no output device".to_string()));
        }
        self.probe.playing.set(true);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.probe.playing.set(false);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.probe.playing.set(false);
        self.probe.position.set(Duration::ZERO);
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        self.probe.position.set(position);
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) {
        self.probe.volume.set(volume);
    }

    fn position(&self) -> Duration {
        self.probe.position.get()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn dispose(self: Box<Self>) -> Result<(), AudioError> {
        self.probe.disposed.set(self.probe.disposed.get() + 1);
        self.probe.live.set(self.probe.live.get() - 1);

        if self.probe.fail_dispose.get() {
            return Err(AudioError::SessionClosed);
        }
        Ok(())
    }
}
