//! Centralized application state and user action routing.
//!
//! `AppState` is the explicitly passed state object the shell owns;
//! `actions::dispatch` turns widget interactions into state and playback
//! changes.

pub mod actions;
pub mod app_state;

pub use {
    actions::{UserAction, dispatch},
    app_state::{AppState, AppStateEvent},
};
