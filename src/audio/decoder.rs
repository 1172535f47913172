//! Audio file decoding using the `symphonia` crate.
//!
//! `AudioDecoder` turns a media file into interleaved `f32` samples and
//! `AudioProducer` runs it on a worker thread, feeding an `rtrb` ring
//! buffer that the output stream drains.

use std::{
    fs::File,
    io::{Error as StdError, ErrorKind::UnexpectedEof},
    path::Path,
    sync::Arc,
    thread::sleep,
    time::Duration,
};

use {
    async_channel::{Receiver, Sender, TryRecvError},
    rtrb::{Producer, PushError::Full},
    symphonia::{
        core::{
            audio::{SampleBuffer, SignalSpec},
            codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions},
            errors::Error as SymphoniaError,
            formats::{FormatOptions, FormatReader, SeekMode::Accurate, SeekTo::Time},
            io::{MediaSourceStream, MediaSourceStreamOptions},
            meta::MetadataOptions,
            probe::Hint,
            units::Time as SymphoniaTime,
        },
        default::{get_codecs, get_probe},
    },
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::audio::{
    engine::{EngineEvent, SessionId},
    output::StreamControl,
};

/// Sleep duration when the ring buffer is full or the worker is idle.
const PRODUCER_SLEEP_DURATION: Duration = Duration::from_millis(2);

/// Error type for audio decoding operations.
#[derive(Error, Debug)]
pub enum DecoderError {
    /// Failed to open or read the audio file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Symphonia decoding error.
    #[error("Decoding error: {0}")]
    SymphoniaError(#[from] SymphoniaError),
    /// No audio track found in file.
    #[error("No audio track found")]
    NoAudioTrack,
}

/// Audio decoder that reads and decodes audio files.
pub struct AudioDecoder {
    /// The underlying format reader.
    format_reader: Box<dyn FormatReader>,
    /// The codec decoder for the selected track.
    decoder: Box<dyn Decoder>,
    /// Id of the selected audio track.
    track_id: u32,
    /// Total frames in the track, if the container reports it.
    n_frames: Option<u64>,
    /// Reused conversion buffer, sized on the first decoded packet.
    sample_buffer: Option<SampleBuffer<f32>>,
    /// Sample rate and channel layout of the decoded stream.
    pub signal_spec: SignalSpec,
}

impl AudioDecoder {
    /// Creates a new audio decoder for the specified file.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError` if:
    /// - The file cannot be opened or read
    /// - The container or codec is not supported
    /// - No audio track is found in the file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DecoderError> {
        let path = path.as_ref();

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecoderError::NoAudioTrack)?;
        let codec_params = &track.codec_params;

        let signal_spec = SignalSpec::new(
            codec_params.sample_rate.unwrap_or(44100),
            codec_params.channels.ok_or(DecoderError::NoAudioTrack)?,
        );
        let track_id = track.id;
        let n_frames = codec_params.n_frames;

        let decoder = get_codecs().make(codec_params, &DecoderOptions::default())?;

        debug!(
            path = %path.display(),
            sample_rate = signal_spec.rate,
            channels = signal_spec.channels.count(),
            "Opened decoder"
        );

        Ok(AudioDecoder {
            format_reader,
            decoder,
            track_id,
            n_frames,
            sample_buffer: None,
            signal_spec,
        })
    }

    /// Number of interleaved channels produced.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.signal_spec.channels.count()
    }

    /// Length of the selected track, if known.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.n_frames.map(|frames| {
            let rate = u64::from(self.signal_spec.rate.max(1));
            Duration::from_secs(frames / rate)
                + Duration::from_nanos((frames % rate) * 1_000_000_000 / rate)
        })
    }

    /// Decodes the next packet of the selected track.
    ///
    /// # Returns
    ///
    /// Interleaved `f32` samples, or `None` at the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError` on unrecoverable read or decode failures.
    /// Corrupt packets are skipped.
    pub fn decode_next_samples(&mut self) -> Result<Option<Vec<f32>>, DecoderError> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == UnexpectedEof => return Ok(None),
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(reason)) => {
                    debug!(reason, "Skipping corrupt packet");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if decoded.frames() == 0 {
                continue;
            }

            let spec = *decoded.spec();
            let frames = decoded.capacity();
            if self
                .sample_buffer
                .as_ref()
                .is_some_and(|buffer| buffer.capacity() < frames * spec.channels.count())
            {
                self.sample_buffer = None;
            }

            let buffer = self
                .sample_buffer
                .get_or_insert_with(|| SampleBuffer::new(frames as u64, spec));
            buffer.copy_interleaved_ref(decoded);

            return Ok(Some(buffer.samples().to_vec()));
        }
    }

    /// Seeks the selected track to `position`.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError` if the container rejects the seek.
    pub fn seek(&mut self, position: Duration) -> Result<(), DecoderError> {
        let time = SymphoniaTime::new(position.as_secs(), f64::from(position.subsec_nanos()) / 1e9);
        self.format_reader.seek(
            Accurate,
            Time {
                time,
                track_id: Some(self.track_id),
            },
        )?;
        self.decoder.reset();
        Ok(())
    }
}

/// Requests handled by the decoder worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecoderCommand {
    /// Discard buffered audio and continue from this position.
    Seek(Duration),
    /// Exit the worker loop.
    Shutdown,
}

/// Audio producer that feeds decoded samples into a ring buffer.
///
/// Runs on a dedicated worker thread until it is told to shut down, the
/// ring buffer's consumer goes away, or decoding fails. After the last
/// sample has been played it reports `EndOfMedia` once and waits for a
/// seek or shutdown.
pub struct AudioProducer {
    decoder: AudioDecoder,
    producer: Producer<f32>,
    commands: Receiver<DecoderCommand>,
    control: Arc<StreamControl>,
    session: SessionId,
    events: Sender<EngineEvent>,
}

impl AudioProducer {
    pub fn new(
        decoder: AudioDecoder,
        producer: Producer<f32>,
        commands: Receiver<DecoderCommand>,
        control: Arc<StreamControl>,
        session: SessionId,
        events: Sender<EngineEvent>,
    ) -> Self {
        Self {
            decoder,
            producer,
            commands,
            control,
            session,
            events,
        }
    }

    /// Runs the production loop.
    pub fn run(mut self) {
        let mut pending: Vec<f32> = Vec::new();
        let mut offset = 0;
        let mut at_end = false;
        let mut end_reported = false;
        let mut deferred = None;

        loop {
            if self.producer.is_abandoned() {
                break;
            }

            match deferred.take().or_else(|| self.poll_command()) {
                Some(DecoderCommand::Shutdown) => break,
                Some(DecoderCommand::Seek(position)) => {
                    pending.clear();
                    offset = 0;
                    at_end = false;
                    end_reported = false;

                    if let Err(e) = self.decoder.seek(position) {
                        self.report_failure(&e);
                        break;
                    }
                    self.control.request_flush();
                    deferred = self.wait_for_flush();
                    continue;
                }
                None => {}
            }

            if at_end {
                if !end_reported && self.ring_drained() {
                    debug!(session = %self.session, "Reached end of media");
                    let _ = self.events.try_send(EngineEvent::end_of_media(self.session));
                    end_reported = true;
                }
                sleep(PRODUCER_SLEEP_DURATION);
                continue;
            }

            if offset >= pending.len() {
                match self.decoder.decode_next_samples() {
                    Ok(Some(samples)) => {
                        pending = samples;
                        offset = 0;
                    }
                    Ok(None) => {
                        at_end = true;
                        continue;
                    }
                    Err(e) => {
                        self.report_failure(&e);
                        break;
                    }
                }
            }

            while offset < pending.len() {
                match self.producer.push(pending[offset]) {
                    Ok(()) => offset += 1,
                    Err(Full(_)) => {
                        sleep(PRODUCER_SLEEP_DURATION);
                        break;
                    }
                }
            }
        }

        debug!(session = %self.session, "Decoder worker exited");
    }

    fn poll_command(&self) -> Option<DecoderCommand> {
        match self.commands.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(DecoderCommand::Shutdown),
        }
    }

    /// Blocks until the output stream has dropped stale samples.
    ///
    /// Returns early with any command that arrives in the meantime.
    fn wait_for_flush(&self) -> Option<DecoderCommand> {
        while self.control.flush_pending() && !self.producer.is_abandoned() {
            if let Some(command) = self.poll_command() {
                return Some(command);
            }
            sleep(PRODUCER_SLEEP_DURATION);
        }
        None
    }

    fn ring_drained(&self) -> bool {
        self.producer.slots() == self.producer.buffer().capacity()
    }

    fn report_failure(&self, error: &DecoderError) {
        warn!(session = %self.session, error = %error, "Decoder worker failed");
        let _ = self
            .events
            .try_send(EngineEvent::failed(self.session, error.to_string()));
    }
}
