//! User preferences and startup configuration.
//!
//! Settings live in a single JSON file under the XDG config directory and
//! are read once when the application starts.

pub mod settings;

pub use settings::{SettingsError, SettingsManager, UserSettings, get_config_path};
