//! Operational error context propagation with `anyhow`.
//!
//! This module provides the context extension trait used at startup, the
//! centralized `ErrorReporter`, and `Notice`, the title/message pair the
//! shell shows in an alert dialog.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::{debug, error, warn},
};

use crate::error::domain::PlaybackError;

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }
}

/// A user-visible notice: a short title plus an explanatory message.
///
/// Notices never imply a state change; the action that produced one has
/// already been rejected or rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Dialog heading.
    pub title: String,
    /// Dialog body.
    pub message: String,
}

impl Notice {
    /// Creates a notice from a title and a message.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Notice for an action that needs a selected song.
    ///
    /// # Arguments
    ///
    /// * `hint` - Where the user should select a song first.
    pub fn no_selection(hint: impl Into<String>) -> Self {
        Self::new("No song selected", hint)
    }
}

/// Centralized error reporting and logging.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a debug-level error (swallowed teardown failures).
    pub fn debug(error: &Error, context: &str) {
        debug!(context = context, error = %error, "Debug error");
    }

    /// Reports a warning-level error (recoverable issues).
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %error, "Warning error");
    }

    /// Reports an error-level error (startup failures).
    pub fn error(error: &Error, context: &str) {
        error!(context = context, error = %error, "Error error");
    }

    /// Converts an error chain to a single line for display.
    ///
    /// Context layers added with `ResultExt` are joined with `": "` so the
    /// root cause stays visible.
    pub fn to_user_message(error: &Error) -> String {
        error
            .chain()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ")
    }

    /// Logs a playback failure and converts it into a notice.
    ///
    /// # Arguments
    ///
    /// * `error` - The failed playback request.
    ///
    /// # Returns
    ///
    /// The `Notice` the shell should present.
    pub fn notice(error: &PlaybackError) -> Notice {
        warn!(error = %error, "Playback request failed");

        match error {
            PlaybackError::MediaNotFound { path } => Notice::new(
                "File not found",
                format!(
                    "Cannot find audio file:\n{}\n\nMake sure it is inside the asset folder and the filename matches.",
                    path.display()
                ),
            ),
            PlaybackError::Engine(reason) => Notice::new(
                "Playback error",
                format!("Could not play the file.\nReason: {reason}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
        path::PathBuf,
    };

    use anyhow::anyhow;

    use crate::error::{
        domain::{AudioError, PlaybackError},
        operational::{ErrorReporter, Notice, ResultExt},
    };

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            write!(f, "Test error")
        }
    }

    impl Error for TestError {}

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<i32, TestError> = Err(TestError);
        let error = result.add_context("Additional context").unwrap_err();

        assert!(error.to_string().contains("Additional context"));
    }

    #[test]
    fn test_result_ext_with_contextf() {
        let result: Result<i32, TestError> = Err(TestError);
        let error = result
            .add_contextf(format_args!("Loading catalog {}", "songs.json"))
            .unwrap_err();

        assert_eq!(error.to_string(), "Loading catalog songs.json");
    }

    #[test]
    fn test_user_message_keeps_root_cause() {
        let result: Result<(), TestError> = Err(TestError);
        let error = result.add_context("Failed to load settings").unwrap_err();
        assert_eq!(
            ErrorReporter::to_user_message(&error),
            "Failed to load settings: Test error"
        );

        let plain = anyhow!("Test error message");
        assert_eq!(ErrorReporter::to_user_message(&plain), "Test error message");
    }

    #[test]
    fn test_notice_for_missing_media() {
        let notice = ErrorReporter::notice(&PlaybackError::MediaNotFound {
            path: PathBuf::from("audio/galena_euphoria.mp3"),
        });

        assert_eq!(notice.title, "File not found");
        assert!(notice.message.contains("audio/galena_euphoria.mp3"));
    }

    #[test]
    fn test_notice_for_engine_failure() {
        let notice = ErrorReporter::notice(&PlaybackError::Engine(AudioError::InvalidOperation {
            reason: "unsupported codec".to_string(),
        }));

        assert_eq!(notice.title, "Playback error");
        assert_eq!(
            notice.message,
            "Could not play the file.\nReason: Invalid operation: unsupported codec"
        );
    }

    #[test]
    fn test_no_selection_notice() {
        let notice = Notice::no_selection("Select a song from the library to add.");
        assert_eq!(notice.title, "No song selected");
    }
}
