//! Persistent bottom player control bar.
//!
//! This module implements the player bar: now-playing text, the progress
//! control with its time label, transport buttons and the volume control.
//! It follows the controller's `PlaybackEvent`s and owns the progress
//! timer, which only runs while a song is playing or paused.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    time::Duration,
};

use {
    libadwaita::{
        glib::{ControlFlow, MainContext, Propagation, SourceId, timeout_add_local},
        gtk::{
            Align::Center,
            Box, Button, EventControllerLegacy, Label,
            Orientation::{Horizontal, Vertical},
            PropagationPhase::Capture,
            Scale,
            gdk::EventType,
            pango::EllipsizeMode::End,
        },
        prelude::{BoxExt, ButtonExt, EventControllerExt, ObjectExt, RangeExt, WidgetExt},
    },
    tracing::debug,
};

use crate::{
    audio::{
        controller::{PlaybackController, PlaybackEvent, PlaybackStatus},
        progress::{ProgressReport, now_playing_label},
    },
    config::UserSettings,
    state::UserAction,
    ui::application::Dispatcher,
};

/// Periodic progress refresh, installed only while playback is ticking.
#[derive(Clone)]
struct ProgressTimer {
    controller: Weak<RefCell<PlaybackController>>,
    interval: Duration,
    source: Rc<RefCell<Option<SourceId>>>,
}

impl ProgressTimer {
    fn new(controller: &Rc<RefCell<PlaybackController>>, interval: Duration) -> Self {
        Self {
            controller: Rc::downgrade(controller),
            interval,
            source: Rc::new(RefCell::new(None)),
        }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.source.borrow().is_some()
    }

    /// Installs or removes the timer source to match `status`.
    fn sync(&self, status: PlaybackStatus) {
        let mut source = self.source.borrow_mut();

        if status.is_ticking() && source.is_none() {
            let controller = self.controller.clone();
            *source = Some(timeout_add_local(self.interval, move || {
                let Some(controller) = controller.upgrade() else {
                    return ControlFlow::Break;
                };
                // A busy controller just skips one refresh.
                if let Ok(mut controller) = controller.try_borrow_mut() {
                    controller.tick();
                }
                ControlFlow::Continue
            }));
            debug!("Progress timer started");
        } else if !status.is_ticking()
            && let Some(id) = source.take()
        {
            id.remove();
            debug!("Progress timer stopped");
        }
    }
}

/// Player control bar.
#[derive(Clone)]
pub struct PlayerBar {
    /// The underlying GTK box widget.
    pub widget: Box,
    /// `Now playing: ...` text.
    pub now_playing_label: Label,
    /// `MM:SS / MM:SS` text.
    pub time_label: Label,
    /// Seekable progress control, in seconds.
    pub progress_scale: Scale,
    /// Plays the library or playlist selection.
    pub play_button: Button,
    /// Pauses playback.
    pub pause_button: Button,
    /// Stops playback and rewinds.
    pub stop_button: Button,
    /// Volume control in `[0.0, 1.0]`.
    pub volume_scale: Scale,
    timer: ProgressTimer,
}

impl PlayerBar {
    /// Creates the player bar and subscribes it to the controller.
    ///
    /// The play button is left unconnected; the window wires it to the
    /// panels' selections.
    #[must_use]
    pub fn new(dispatcher: &Dispatcher, settings: &UserSettings) -> Self {
        let widget = Box::builder()
            .orientation(Vertical)
            .spacing(6)
            .margin_top(6)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(12)
            .css_classes(["player-bar"])
            .build();

        let now_playing_label = Label::builder()
            .label(now_playing_label(None))
            .xalign(0.0)
            .ellipsize(End)
            .build();
        widget.append(&now_playing_label);

        // Progress row
        let progress_row = Box::builder().orientation(Horizontal).spacing(12).build();

        let progress_scale = Scale::builder()
            .orientation(Horizontal)
            .hexpand(true)
            .draw_value(false)
            .sensitive(false)
            .build();
        progress_scale.set_range(0.0, 0.0);
        progress_row.append(&progress_scale);

        let time_label = Label::builder()
            .label(ProgressReport::default().label())
            .width_chars(13)
            .css_classes(["numeric", "dim-label"])
            .build();
        progress_row.append(&time_label);

        widget.append(&progress_row);

        // Transport and volume row
        let controls = Box::builder()
            .orientation(Horizontal)
            .spacing(6)
            .halign(Center)
            .build();

        let play_button = Button::builder()
            .icon_name("media-playback-start-symbolic")
            .tooltip_text("Play")
            .build();
        controls.append(&play_button);

        let pause_button = Button::builder()
            .icon_name("media-playback-pause-symbolic")
            .tooltip_text("Pause")
            .build();
        controls.append(&pause_button);

        let stop_button = Button::builder()
            .icon_name("media-playback-stop-symbolic")
            .tooltip_text("Stop")
            .build();
        controls.append(&stop_button);

        let volume_label = Label::builder().label("Volume").margin_start(18).build();
        controls.append(&volume_label);

        let volume_scale = Scale::builder()
            .orientation(Horizontal)
            .width_request(140)
            .draw_value(false)
            .build();
        volume_scale.set_range(0.0, 1.0);
        volume_scale.set_increments(0.05, 0.1);
        volume_scale.set_value(settings.initial_volume);
        controls.append(&volume_scale);

        widget.append(&controls);

        let interval = Duration::from_millis(settings.progress_interval_ms);
        let player_bar = Self {
            widget,
            now_playing_label,
            time_label,
            progress_scale,
            play_button,
            pause_button,
            stop_button,
            volume_scale,
            timer: ProgressTimer::new(dispatcher.controller(), interval),
        };

        player_bar.connect_controls(dispatcher);
        player_bar.subscribe_to_playback(dispatcher);

        player_bar
    }

    /// Connects transport, seek and volume controls to the dispatcher.
    fn connect_controls(&self, dispatcher: &Dispatcher) {
        let pause_dispatcher = dispatcher.clone();
        self.pause_button
            .connect_clicked(move |_| pause_dispatcher.send(UserAction::Pause));

        let stop_dispatcher = dispatcher.clone();
        self.stop_button
            .connect_clicked(move |_| stop_dispatcher.send(UserAction::Stop));

        // Press and release bracket a scrub. The scale's drag gesture claims
        // the sequence; only a capture-phase legacy controller sees the release.
        let scrub_controller = EventControllerLegacy::new();
        scrub_controller.set_propagation_phase(Capture);
        let scrub_dispatcher = dispatcher.clone();
        let scale = self.progress_scale.downgrade();
        scrub_controller.connect_event(move |_, event| {
            match event.event_type() {
                EventType::ButtonPress | EventType::TouchBegin => {
                    scrub_dispatcher.send(UserAction::BeginSeek);
                }
                EventType::ButtonRelease | EventType::TouchEnd => {
                    if let Some(scale) = scale.upgrade() {
                        scrub_dispatcher.send(UserAction::SeekReleased(scale.value()));
                    }
                }
                _ => {}
            }
            Propagation::Proceed
        });
        self.progress_scale.add_controller(scrub_controller);

        // Keyboard and scroll changes seek immediately.
        let key_dispatcher = dispatcher.clone();
        self.progress_scale
            .connect_change_value(move |_, _, value| {
                let scrubbing = key_dispatcher
                    .controller()
                    .try_borrow()
                    .is_ok_and(|controller| controller.is_scrubbing());
                if !scrubbing {
                    key_dispatcher.send(UserAction::SeekReleased(value));
                }
                Propagation::Proceed
            });

        let volume_dispatcher = dispatcher.clone();
        self.volume_scale.connect_value_changed(move |scale| {
            volume_dispatcher.send(UserAction::SetVolume(scale.value()));
        });
    }

    /// Follows controller events on the main context.
    fn subscribe_to_playback(&self, dispatcher: &Dispatcher) {
        let receiver = dispatcher.controller().borrow_mut().subscribe();
        let player_bar = self.clone();

        debug!("PlayerBar: Subscribing to playback events");
        MainContext::default().spawn_local(async move {
            while let Ok(event) = receiver.recv().await {
                player_bar.apply(&event);
            }
            debug!("PlayerBar playback subscription closed");
        });
    }

    /// Updates the widgets for one playback event.
    pub fn apply(&self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::StatusChanged(status) => {
                debug!(status = ?status, "PlayerBar: status changed");
                if *status == PlaybackStatus::Idle {
                    self.progress_scale.set_sensitive(false);
                    self.progress_scale.set_range(0.0, 0.0);
                }
                self.timer.sync(*status);
            }
            PlaybackEvent::NowPlaying(song) => {
                self.now_playing_label
                    .set_label(&now_playing_label(song.as_ref()));
            }
            PlaybackEvent::Ready { duration } => {
                let upper = duration.map_or(0.0, |d| d.as_secs_f64());
                self.progress_scale.set_range(0.0, upper);
                self.progress_scale.set_sensitive(true);
            }
            PlaybackEvent::Progress(report) => {
                self.progress_scale.set_value(report.position_secs());
                self.time_label.set_label(&report.label());
            }
        }
    }
}
