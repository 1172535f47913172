//! Audio file metadata extraction using the `lofty` crate.
//!
//! The catalog uses this to fill in fields a catalog entry leaves out,
//! most commonly the duration.

use std::{path::Path, time::Duration};

use {
    lofty::{
        error::LoftyError,
        prelude::{AudioFile, TaggedFileExt},
        probe::Probe,
        tag::Accessor,
    },
    thiserror::Error,
};

/// Error type for metadata extraction operations.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Failed to read or parse the audio file.
    #[error("Failed to read audio file: {0}")]
    ReadError(#[from] LoftyError),
}

/// Tag and property summary of one media file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSummary {
    /// Title from the primary tag.
    pub title: Option<String>,
    /// Artist from the primary tag.
    pub artist: Option<String>,
    /// Genre from the primary tag.
    pub genre: Option<String>,
    /// Playback length reported by the container.
    pub duration: Duration,
}

/// Reads tag summaries from audio files.
pub struct TagReader;

impl TagReader {
    /// Probes a file and reads its primary tag and audio properties.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the audio file.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if the file cannot be opened or its format
    /// is not recognized.
    pub fn read_summary<P: AsRef<Path>>(path: P) -> Result<MediaSummary, MetadataError> {
        let tagged_file = Probe::open(path.as_ref())?.read()?;
        let primary_tag = tagged_file.primary_tag();

        Ok(MediaSummary {
            title: primary_tag.and_then(|tag| tag.title().map(|s| s.to_string())),
            artist: primary_tag.and_then(|tag| tag.artist().map(|s| s.to_string())),
            genre: primary_tag.and_then(|tag| tag.genre().map(|s| s.to_string())),
            duration: tagged_file.properties().duration(),
        })
    }
}
