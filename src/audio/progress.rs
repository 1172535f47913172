//! Elapsed-time formatting for the player bar.

use std::time::Duration;

use crate::library::models::Song;

/// Formats whole seconds as zero-padded `MM:SS`.
///
/// Fractions are floored. Negative and non-finite inputs read as
/// `00:00`. Minutes are not wrapped into hours, so an hour-long track shows
/// `60:00`.
///
/// # Arguments
///
/// * `seconds` - Elapsed or total seconds.
#[must_use]
pub fn format_clock(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Label for the now-playing line.
#[must_use]
pub fn now_playing_label(song: Option<&Song>) -> String {
    match song {
        Some(song) => format!("Now playing: {song}"),
        None => "Now playing: (none)".to_string(),
    }
}

/// A snapshot of playback progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressReport {
    /// Current position.
    pub position: Duration,
    /// Total length; `None` when unknown.
    pub duration: Option<Duration>,
}

impl ProgressReport {
    pub fn new(position: Duration, duration: Option<Duration>) -> Self {
        Self { position, duration }
    }

    /// `MM:SS / MM:SS`, with an unknown duration shown as `00:00`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.position.as_secs_f64()),
            format_clock(self.duration.map_or(0.0, |d| d.as_secs_f64()))
        )
    }

    /// Position in seconds, for the progress scale.
    #[must_use]
    pub fn position_secs(&self) -> f64 {
        self.position.as_secs_f64()
    }

    /// Upper bound of the progress scale in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration.map_or(0.0, |d| d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        audio::progress::{ProgressReport, format_clock, now_playing_label},
        library::models::Song,
    };

    #[test]
    fn test_format_clock_reference_values() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(65.0), "01:05");
        assert_eq!(format_clock(3599.0), "59:59");
        assert_eq!(format_clock(-3.0), "00:00");
    }

    #[test]
    fn test_format_clock_floors_and_handles_unknown() {
        assert_eq!(format_clock(59.999), "00:59");
        assert_eq!(format_clock(f64::NAN), "00:00");
        assert_eq!(format_clock(f64::INFINITY), "00:00");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn test_progress_label() {
        let report = ProgressReport::new(Duration::from_millis(65_400), Some(Duration::from_secs(215)));
        assert_eq!(report.label(), "01:05 / 03:35");

        let unknown = ProgressReport::new(Duration::from_secs(3), None);
        assert_eq!(unknown.label(), "00:03 / 00:00");
        assert_eq!(ProgressReport::default().label(), "00:00 / 00:00");
    }

    #[test]
    fn test_now_playing_label() {
        let song = Song::new("Стара каравана", "Галена", "Pop-Folk", 220, "audio/x.mp3");

        assert_eq!(now_playing_label(None), "Now playing: (none)");
        assert_eq!(
            now_playing_label(Some(&song)),
            "Now playing: Стара каравана — Галена"
        );
    }
}
