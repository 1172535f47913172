//! Audio playback system.
//!
//! The `PlaybackController` drives one engine session at a time through the
//! `MediaEngine` interface. The desktop build provides a native engine that
//! decodes with symphonia, buffers through rtrb and plays through cpal.

pub mod controller;
#[cfg(feature = "desktop")]
pub mod decoder;
pub mod engine;
#[cfg(test)]
pub(crate) mod fake_engine;
pub mod media;
pub mod metadata;
#[cfg(feature = "desktop")]
pub mod native;
#[cfg(feature = "desktop")]
pub mod output;
pub mod progress;
