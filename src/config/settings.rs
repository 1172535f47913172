//! User preference management with XDG Base Directory compliance.
//!
//! This module provides the serializable `UserSettings` and the
//! `SettingsManager` that loads, validates and saves them.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Serializable user settings structure with default values.
///
/// Missing fields in the settings file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Directory that relative song paths resolve against (`None` = working directory).
    pub asset_root: Option<String>,
    /// Optional JSON catalog replacing the built-in demo catalog.
    pub catalog_path: Option<String>,
    /// Name of the local user.
    pub username: String,
    /// Playlist created and selected at startup.
    pub default_playlist_name: String,
    /// Volume applied to new playback sessions, in `[0.0, 1.0]`.
    pub initial_volume: f64,
    /// Progress refresh period in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            asset_root: None,
            catalog_path: None,
            username: "Gogo".to_string(),
            default_playlist_name: "My Playlist".to_string(),
            initial_volume: 0.7,
            progress_interval_ms: 200,
        }
    }
}

impl UserSettings {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if the volume is outside
    /// `[0.0, 1.0]` or the progress interval is zero.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(SettingsError::InvalidValue {
                reason: format!(
                    "initial_volume must be within 0.0..=1.0, got {}",
                    self.initial_volume
                ),
            });
        }

        if self.progress_interval_ms == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "progress_interval_ms must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Resolved asset root directory.
    #[must_use]
    pub fn asset_root_path(&self) -> PathBuf {
        self.asset_root
            .as_deref()
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
    }
}

/// Handles loading, saving, and validation of user preferences.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe user settings storage.
    settings: RwLock<UserSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Custom path for the settings file
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SettingsManager` or a `SettingsError`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file exists but cannot be read,
    /// parsed, or holds out-of-range values.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            let settings: UserSettings = from_str(&contents)?;
            settings.validate()?;
            settings
        } else {
            debug!("No settings file at {:?}, using defaults", config_path);
            UserSettings::default()
        };

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Validates, applies and saves new settings.
    ///
    /// # Arguments
    ///
    /// * `new_settings` - New settings to apply.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if validation fails or the file cannot be
    /// written. Invalid settings are not applied.
    pub fn update_settings(&self, new_settings: UserSettings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    /// Saves the current settings to disk.
    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        if let Some(parent) = self.config_path.parent() {
            create_dir_all(parent)?;
        }
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Path of the settings file under the XDG config directory.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("melodia");
    config_dir.push("settings.json");
    config_dir
}

/// Gets the XDG config home directory.
///
/// Uses `XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}
