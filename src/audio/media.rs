//! Resolution of catalog paths to media files.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::PlaybackError;

/// The directory relative song paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRoot {
    root: PathBuf,
}

impl MediaRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a song path to a readable file.
    ///
    /// Absolute paths are used as-is.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::MediaNotFound` if the resolved path is not a
    /// regular file or cannot be opened for reading.
    pub fn resolve(&self, file_path: &str) -> Result<PathBuf, PlaybackError> {
        let path = self.root.join(file_path);

        if path.is_file() && File::open(&path).is_ok() {
            Ok(path)
        } else {
            debug!(path = %path.display(), "Media file missing or unreadable");
            Err(PlaybackError::MediaNotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir, write};

    use tempfile::TempDir;

    use crate::{audio::media::MediaRoot, error::PlaybackError};

    #[test]
    fn test_resolve_existing_relative_path() {
        let temp_dir = TempDir::new().unwrap();
        create_dir(temp_dir.path().join("audio")).unwrap();
        write(temp_dir.path().join("audio/song.mp3"), b"ID3").unwrap();

        let root = MediaRoot::new(temp_dir.path());
        let resolved = root.resolve("audio/song.mp3").unwrap();

        assert_eq!(resolved, temp_dir.path().join("audio/song.mp3"));
    }

    #[test]
    fn test_missing_file_reports_full_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = MediaRoot::new(temp_dir.path());

        match root.resolve("audio/none.mp3") {
            Err(PlaybackError::MediaNotFound { path }) => {
                assert_eq!(path, temp_dir.path().join("audio/none.mp3"));
            }
            other => panic!("expected MediaNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_is_not_media() {
        let temp_dir = TempDir::new().unwrap();
        create_dir(temp_dir.path().join("audio")).unwrap();

        assert!(MediaRoot::new(temp_dir.path()).resolve("audio").is_err());
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("abs.ogg");
        write(&file, b"OggS").unwrap();

        let root = MediaRoot::new("/nonexistent-root");
        assert_eq!(root.resolve(file.to_str().unwrap()).unwrap(), file);
    }
}
