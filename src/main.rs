//! Melodia - Desktop Music Library
//!
//! This is the main entry point for the Melodia music player application.
//! It installs logging, reads the settings file, initializes Libadwaita and
//! starts the main application loop.

use {
    libadwaita::glib::ExitCode,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use melodia::{
    config::{SettingsManager, UserSettings},
    error::{ErrorReporter, ResultExt, UiError},
    ui::MelodiaApplication,
};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "melodia=info,warn";

/// Installs the stderr `tracing` subscriber.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

fn main() -> ExitCode {
    init_logging();

    if let Err(e) = libadwaita::init() {
        let e = UiError::InitializationError(e.to_string());
        ErrorReporter::error(&e.into(), "startup");
        return ExitCode::FAILURE;
    }

    let settings = match SettingsManager::new().add_context("Failed to load settings") {
        Ok(manager) => {
            let settings = manager.get_settings().clone();
            settings
        }
        Err(e) => {
            ErrorReporter::warn(&e, "startup");
            UserSettings::default()
        }
    };

    match MelodiaApplication::new(settings) {
        Ok(app) => app.run(),
        Err(e) => {
            ErrorReporter::error(&e, "startup");
            ExitCode::FAILURE
        }
    }
}
