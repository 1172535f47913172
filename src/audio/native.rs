//! Desktop engine backed by symphonia decoding and cpal output.
//!
//! Each session owns a decoder worker thread, an `rtrb` ring buffer and a
//! cpal stream. Sessions are created paused and report `Ready` as soon as
//! the stream is built.

use std::{
    path::Path,
    sync::Arc,
    thread::{Builder, JoinHandle},
    time::Duration,
};

use {
    async_channel::{Sender, unbounded},
    cpal::{Stream, traits::StreamTrait},
    rtrb::RingBuffer,
    tracing::{debug, info},
};

use crate::{
    audio::{
        decoder::{AudioDecoder, AudioProducer, DecoderCommand},
        engine::{EngineEvent, EngineSession, MediaEngine, SessionId},
        output::{AudioOutput, OutputError, StreamControl},
    },
    error::AudioError,
};

/// Ring buffer size in samples.
const RING_CAPACITY: usize = 16_384;

/// Opens sessions on the default output device.
#[derive(Debug, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl MediaEngine for NativeEngine {
    fn open(
        &mut self,
        path: &Path,
        id: SessionId,
        events: Sender<EngineEvent>,
    ) -> Result<Box<dyn EngineSession>, AudioError> {
        let decoder = AudioDecoder::new(path)?;
        let spec = decoder.signal_spec;
        let duration = decoder.duration();

        let (producer, consumer) = RingBuffer::<f32>::new(RING_CAPACITY);
        let control = Arc::new(StreamControl::new(0.0));

        let output = AudioOutput::new()?;
        let stream =
            output.build_stream(&spec, consumer, Arc::clone(&control), id, events.clone())?;
        stream.pause().map_err(OutputError::from)?;

        let (command_tx, command_rx) = unbounded();
        let worker_control = Arc::clone(&control);
        let worker_events = events.clone();
        let worker = Builder::new()
            .name(format!("melodia-decoder-{}", id.0))
            .spawn(move || {
                AudioProducer::new(
                    decoder,
                    producer,
                    command_rx,
                    worker_control,
                    id,
                    worker_events,
                )
                .run();
            })
            .map_err(|e| AudioError::InvalidOperation {
                reason: format!("Failed to spawn decoder thread: {e}"),
            })?;

        info!(session = %id, path = %path.display(), "Opened native session");
        let _ = events.try_send(EngineEvent::ready(id));

        Ok(Box::new(NativeSession {
            id,
            stream: Some(stream),
            control,
            commands: command_tx,
            worker: Some(worker),
            sample_rate: spec.rate,
            duration,
        }))
    }
}

/// One loaded media file on the default device.
struct NativeSession {
    id: SessionId,
    stream: Option<Stream>,
    control: Arc<StreamControl>,
    commands: Sender<DecoderCommand>,
    worker: Option<JoinHandle<()>>,
    sample_rate: u32,
    duration: Option<Duration>,
}

impl NativeSession {
    fn stream(&self) -> Result<&Stream, AudioError> {
        self.stream.as_ref().ok_or(AudioError::SessionClosed)
    }

    /// Stops the stream and joins the decoder worker.
    fn shut_down(&mut self) -> Result<(), AudioError> {
        drop(self.stream.take());
        let _ = self.commands.try_send(DecoderCommand::Shutdown);

        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| AudioError::EngineFailure("decoder thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl EngineSession for NativeSession {
    fn play(&mut self) -> Result<(), AudioError> {
        self.stream()?.play().map_err(OutputError::from)?;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.stream()?.pause().map_err(OutputError::from)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.pause()?;
        self.seek(Duration::ZERO)
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        let frames = position.as_secs_f64() * f64::from(self.sample_rate);
        self.control.set_frames_played(frames as u64);
        self.commands
            .try_send(DecoderCommand::Seek(position))
            .map_err(|_| AudioError::SessionClosed)
    }

    fn set_volume(&mut self, volume: f64) {
        self.control.set_volume(volume as f32);
    }

    fn position(&self) -> Duration {
        let seconds = self.control.frames_played() as f64 / f64::from(self.sample_rate.max(1));
        let position = Duration::from_secs_f64(seconds);
        self.duration.map_or(position, |duration| position.min(duration))
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn dispose(mut self: Box<Self>) -> Result<(), AudioError> {
        debug!(session = %self.id, "Disposing native session");
        self.shut_down()
    }
}

impl Drop for NativeSession {
    fn drop(&mut self) {
        let _ = self.shut_down();
    }
}
