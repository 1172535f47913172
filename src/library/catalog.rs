//! The read-only song catalog.
//!
//! A `MusicLibrary` is fixed once constructed. It comes either from the
//! built-in demo set or from a JSON catalog file.

use std::{fs::read_to_string, path::Path};

use {
    serde::Deserialize,
    serde_json::from_str,
    tracing::{debug, info, warn},
};

use crate::{
    audio::metadata::{MediaSummary, TagReader},
    error::LibraryError,
    library::models::Song,
};

/// Genre shared by the built-in demo songs.
const DEMO_GENRE: &str = "Pop-Folk";

/// One entry of a JSON catalog file.
///
/// Only `file_path` is mandatory. Missing fields are read from the media
/// file's tags when possible.
#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    title: Option<String>,
    artist: Option<String>,
    genre: Option<String>,
    duration_seconds: Option<u32>,
    file_path: String,
}

/// Ordered, read-only collection of every playable song.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicLibrary {
    songs: Vec<Song>,
}

impl MusicLibrary {
    /// Creates a library from an explicit song list.
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    /// The built-in demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(vec![
            Song::new(
                "Моето слабо място",
                "Преслава",
                DEMO_GENRE,
                215,
                "audio/preslava_moeto_slabo_myasto.mp3",
            ),
            Song::new("Пиян", "Преслава", DEMO_GENRE, 205, "audio/preslava_piyan.mp3"),
            Song::new(
                "Стара каравана",
                "Галена",
                DEMO_GENRE,
                220,
                "audio/galena_stara_karavana.mp3",
            ),
            Song::new("Euphoria", "Галена", DEMO_GENRE, 210, "audio/galena_euphoria.mp3"),
        ])
    }

    /// Loads a catalog from a JSON file.
    ///
    /// The file holds an array of entries. Fields an entry leaves out are
    /// filled from the media file under `asset_root`: title, artist and
    /// genre from its primary tag, duration from its audio properties.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the catalog file.
    /// * `asset_root` - Directory that entry paths are relative to.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `MusicLibrary` or a `LibraryError`.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the file cannot be read or parsed, or an
    /// entry ends up without a title or artist.
    pub fn from_json_file<P: AsRef<Path>>(
        path: P,
        asset_root: &Path,
    ) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let entries: Vec<CatalogEntry> = from_str(&read_to_string(path)?)?;

        let songs = entries
            .into_iter()
            .map(|entry| resolve_entry(entry, asset_root))
            .collect::<Result<Vec<_>, _>>()?;

        info!(catalog = %path.display(), songs = songs.len(), "Loaded catalog");
        Ok(Self::new(songs))
    }

    /// All songs in catalog order.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Whether `song` is one of this catalog's songs.
    pub fn contains(&self, song: &Song) -> bool {
        self.songs.contains(song)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl Default for MusicLibrary {
    fn default() -> Self {
        Self::demo()
    }
}

/// Turns a catalog entry into a song, probing the media file only when a
/// field is missing.
fn resolve_entry(entry: CatalogEntry, asset_root: &Path) -> Result<Song, LibraryError> {
    let complete = entry.title.is_some()
        && entry.artist.is_some()
        && entry.genre.is_some()
        && entry.duration_seconds.is_some();

    let summary = if complete {
        MediaSummary::default()
    } else {
        let media_path = asset_root.join(&entry.file_path);
        debug!(path = %media_path.display(), "Probing media for missing catalog fields");
        TagReader::read_summary(&media_path).unwrap_or_else(|e| {
            warn!(path = %media_path.display(), error = %e, "Could not probe catalog entry");
            MediaSummary::default()
        })
    };

    let title = entry
        .title
        .or(summary.title)
        .ok_or_else(|| LibraryError::InvalidData {
            reason: format!("entry '{}' has no title", entry.file_path),
        })?;
    let artist = entry
        .artist
        .or(summary.artist)
        .ok_or_else(|| LibraryError::InvalidData {
            reason: format!("entry '{}' has no artist", entry.file_path),
        })?;
    let genre = entry.genre.or(summary.genre).unwrap_or_default();
    let duration_seconds = entry.duration_seconds.unwrap_or_else(|| {
        u32::try_from(summary.duration.as_secs()).unwrap_or(u32::MAX)
    });

    Ok(Song::new(title, artist, genre, duration_seconds, entry.file_path))
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::TempDir;

    use crate::{
        error::LibraryError,
        library::{catalog::MusicLibrary, models::Song},
    };

    #[test]
    fn test_demo_catalog() {
        let library = MusicLibrary::demo();

        assert_eq!(library.len(), 4);
        let titles: Vec<_> = library.songs().iter().map(Song::title).collect();
        assert_eq!(
            titles,
            ["Моето слабо място", "Пиян", "Стара каравана", "Euphoria"]
        );
        assert!(library.songs().iter().all(|s| s.genre() == "Pop-Folk"));
        assert!(library.songs().iter().all(|s| s.file_path().starts_with("audio/")));
    }

    #[test]
    fn test_contains_uses_value_equality() {
        let library = MusicLibrary::demo();
        let copy = library.songs()[2].clone();
        let stranger = Song::new("Unknown", "Nobody", "Pop", 1, "audio/unknown.mp3");

        assert!(library.contains(&copy));
        assert!(!library.contains(&stranger));
    }

    #[test]
    fn test_load_complete_catalog_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        write(
            &path,
            r#"[
                {"title": "A", "artist": "X", "genre": "Rock", "duration_seconds": 61, "file_path": "a.flac"},
                {"title": "B", "artist": "Y", "genre": "Jazz", "duration_seconds": 0, "file_path": "b.ogg"}
            ]"#,
        )
        .unwrap();

        let library = MusicLibrary::from_json_file(&path, temp_dir.path()).unwrap();

        assert_eq!(
            library.songs(),
            [
                Song::new("A", "X", "Rock", 61, "a.flac"),
                Song::new("B", "Y", "Jazz", 0, "b.ogg"),
            ]
        );
    }

    #[test]
    fn test_unprobeable_duration_defaults_to_zero() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        write(
            &path,
            r#"[{"title": "A", "artist": "X", "file_path": "missing.mp3"}]"#,
        )
        .unwrap();

        let library = MusicLibrary::from_json_file(&path, temp_dir.path()).unwrap();

        assert_eq!(library.songs()[0].duration_seconds(), 0);
        assert_eq!(library.songs()[0].genre(), "");
    }

    #[test]
    fn test_entry_without_title_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        write(&path, r#"[{"artist": "X", "file_path": "missing.mp3"}]"#).unwrap();

        assert!(matches!(
            MusicLibrary::from_json_file(&path, temp_dir.path()),
            Err(LibraryError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_malformed_catalog_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.json");
        write(&path, r#"{"songs": []}"#).unwrap();

        assert!(matches!(
            MusicLibrary::from_json_file(&path, temp_dir.path()),
            Err(LibraryError::SerializationError(_))
        ));
        assert!(matches!(
            MusicLibrary::from_json_file(temp_dir.path().join("absent.json"), temp_dir.path()),
            Err(LibraryError::IoError(_))
        ));
    }
}
