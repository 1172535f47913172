//! Audio output management using the `cpal` crate.
//!
//! Opens the default output device at the decoded stream's own sample
//! rate and drains the decoder's ring buffer from the device callback.
//! Volume, seek flushes and the played-frame clock are shared with the
//! session through `StreamControl`.

use std::sync::{
    Arc,
    atomic::{
        AtomicBool, AtomicU32, AtomicU64,
        Ordering::{Acquire, Relaxed, Release},
    },
};

use {
    async_channel::Sender,
    cpal::{
        BufferSize::Default as CpalDefault,
        BuildStreamError, Device, FromSample, OutputCallbackInfo, PauseStreamError,
        PlayStreamError, Sample,
        SampleFormat::{self, F32, I16, U16},
        SizedSample, Stream, StreamConfig, StreamError, SupportedStreamConfig, default_host,
        traits::{DeviceTrait, HostTrait},
    },
    rtrb::Consumer,
    symphonia::core::audio::SignalSpec,
    thiserror::Error,
    tracing::{debug, error},
};

use crate::audio::engine::{EngineEvent, SessionId};

/// Error type for audio output operations.
#[derive(Error, Debug)]
pub enum OutputError {
    /// CPAL stream construction error.
    #[error("Audio output error: {0}")]
    CpalError(#[from] BuildStreamError),
    /// Failed to start audio stream.
    #[error("Failed to start audio stream: {0}")]
    StreamStartError(#[from] PlayStreamError),
    /// Failed to pause audio stream.
    #[error("Failed to pause audio stream: {0}")]
    StreamPauseError(#[from] PauseStreamError),
    /// No suitable audio device found.
    #[error("No suitable audio device found")]
    NoDeviceFound,
    /// The device cannot play the stream without resampling or remixing.
    #[error("Device does not support {channels} channel(s) at {sample_rate} Hz")]
    UnsupportedStream { sample_rate: u32, channels: usize },
    /// Unsupported sample format.
    #[error("Unsupported sample format: {format:?}")]
    UnsupportedSampleFormat { format: SampleFormat },
}

/// State shared between a session, its decoder worker and the device
/// callback.
#[derive(Debug)]
pub struct StreamControl {
    /// Set by the decoder after a seek; cleared by the callback once it
    /// has discarded everything queued before the seek.
    flush: AtomicBool,
    /// Source frames handed to the device since the last seek target.
    frames_played: AtomicU64,
    /// Linear gain as `f32` bits.
    volume: AtomicU32,
}

impl StreamControl {
    pub fn new(volume: f32) -> Self {
        Self {
            flush: AtomicBool::new(false),
            frames_played: AtomicU64::new(0),
            volume: AtomicU32::new(volume.to_bits()),
        }
    }

    pub fn request_flush(&self) {
        self.flush.store(true, Release);
    }

    #[must_use]
    pub fn flush_pending(&self) -> bool {
        self.flush.load(Acquire)
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.store(volume.clamp(0.0, 1.0).to_bits(), Relaxed);
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Relaxed))
    }

    #[must_use]
    pub fn frames_played(&self) -> u64 {
        self.frames_played.load(Relaxed)
    }

    /// Moves the frame clock, used when seeking.
    pub fn set_frames_played(&self, frames: u64) {
        self.frames_played.store(frames, Relaxed);
    }
}

/// Manages the output device for one session.
pub struct AudioOutput {
    /// The selected output device.
    device: Device,
}

impl AudioOutput {
    /// Opens the default output device of the default host.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::NoDeviceFound` if the host has no output device.
    pub fn new() -> Result<Self, OutputError> {
        let device = default_host()
            .default_output_device()
            .ok_or(OutputError::NoDeviceFound)?;

        Ok(AudioOutput { device })
    }

    /// Picks a device configuration that plays `source` unchanged.
    ///
    /// The sample rate must be supported natively. Channel counts must
    /// match, except mono which is duplicated onto every device channel.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if the device cannot be queried or offers no
    /// matching configuration.
    pub fn select_config(&self, source: &SignalSpec) -> Result<SupportedStreamConfig, OutputError> {
        let source_channels = source.channels.count();
        let unsupported = || OutputError::UnsupportedStream {
            sample_rate: source.rate,
            channels: source_channels,
        };

        let ranges: Vec<_> = self
            .device
            .supported_output_configs()
            .map_err(|_| OutputError::NoDeviceFound)?
            .filter(|range| {
                range.min_sample_rate() <= source.rate && source.rate <= range.max_sample_rate()
            })
            .collect();

        let exact = ranges
            .iter()
            .find(|range| usize::from(range.channels()) == source_channels);
        let fallback = || {
            ranges
                .iter()
                .filter(|_| source_channels == 1)
                .min_by_key(|range| range.channels())
        };

        exact
            .or_else(fallback)
            .map(|range| range.clone().with_sample_rate(source.rate))
            .ok_or_else(unsupported)
    }

    /// Builds a paused-until-started output stream draining `consumer`.
    ///
    /// Stream errors are logged and reported as `Failed` for `session`.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if no configuration fits or the stream cannot
    /// be built.
    pub fn build_stream(
        &self,
        source: &SignalSpec,
        consumer: Consumer<f32>,
        control: Arc<StreamControl>,
        session: SessionId,
        events: Sender<EngineEvent>,
    ) -> Result<Stream, OutputError> {
        let supported = self.select_config(source)?;
        let stream_config = StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: CpalDefault,
        };

        debug!(
            session = %session,
            sample_rate = stream_config.sample_rate,
            channels = stream_config.channels,
            format = ?supported.sample_format(),
            "Building output stream"
        );

        let feeder = Feeder {
            consumer,
            control,
            source_channels: source.channels.count(),
            device_channels: usize::from(stream_config.channels),
        };

        match supported.sample_format() {
            F32 => self.build_typed::<f32>(&stream_config, feeder, session, events),
            I16 => self.build_typed::<i16>(&stream_config, feeder, session, events),
            U16 => self.build_typed::<u16>(&stream_config, feeder, session, events),
            format => Err(OutputError::UnsupportedSampleFormat { format }),
        }
    }

    fn build_typed<T>(
        &self,
        stream_config: &StreamConfig,
        mut feeder: Feeder,
        session: SessionId,
        events: Sender<EngineEvent>,
    ) -> Result<Stream, OutputError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let err_fn = move |err: StreamError| {
            error!(session = %session, error = %err, "Audio stream error");
            let _ = events.try_send(EngineEvent::failed(session, err.to_string()));
        };

        let stream = self.device.build_output_stream(
            stream_config,
            move |data: &mut [T], _: &OutputCallbackInfo| feeder.fill(data),
            err_fn,
            None,
        )?;

        Ok(stream)
    }
}

/// Device callback state.
struct Feeder {
    consumer: Consumer<f32>,
    control: Arc<StreamControl>,
    source_channels: usize,
    device_channels: usize,
}

impl Feeder {
    fn fill<T: Sample + FromSample<f32>>(&mut self, data: &mut [T]) {
        if self.control.flush_pending() {
            while self.consumer.pop().is_ok() {}
            self.control.flush.store(false, Release);
        }

        let gain = self.control.volume();
        let mut frames = 0;

        for frame in data.chunks_mut(self.device_channels) {
            if self.consumer.slots() < self.source_channels {
                frame.fill(T::EQUILIBRIUM);
                continue;
            }

            if self.source_channels == 1 {
                let value = self.next_sample(gain);
                frame.fill(T::from_sample(value));
            } else {
                for slot in frame.iter_mut() {
                    *slot = T::from_sample(self.next_sample(gain));
                }
            }
            frames += 1;
        }

        self.control.frames_played.fetch_add(frames, Relaxed);
    }

    fn next_sample(&mut self, gain: f32) -> f32 {
        self.consumer
            .pop()
            .map_or(0.0, |sample| (sample * gain).clamp(-1.0, 1.0))
    }
}
