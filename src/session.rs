// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Ties the voice, the motion sensor and the outputs together.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, tick, Sender};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use snafu::ResultExt;

use crate::error::{ensure_positive, ResourceUnavailable, Result};
use crate::instrument::InstrumentMode;
use crate::motion::{MotionMapper, MotionParameters, Orientation};
use crate::output::{AudioSink, Haptics, Silent};
use crate::playback::{HapticPulse, PlaybackController, PlaybackState};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often the latest motion parameters are forwarded to the voice.
    pub link_rate_hz: f64,
    /// Whether orientation samples are accepted from the start.
    pub motion_enabled: bool,
    pub haptic_pulse: HapticPulse,
    pub initial_mode: InstrumentMode,
    pub initial_amplitude: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            link_rate_hz: 50.0,
            motion_enabled: true,
            haptic_pulse: HapticPulse::default(),
            initial_mode: InstrumentMode::default(),
            initial_amplitude: 0.5,
        }
    }
}

/// State shared with the link thread.
struct Shared {
    controller: Mutex<PlaybackController>,
    motion: Mutex<MotionMapper>,
    /// Parameters most recently handed to the controller by the link.
    forwarded: Mutex<Option<MotionParameters>>,
}

impl Shared {
    /// Hand the latest motion parameters to the controller, if motion is enabled
    /// and they changed since the last time. Returns whether anything was forwarded.
    ///
    /// Both parameters are applied even if one of them fails. A failed update is
    /// not remembered as forwarded, so the next call tries again.
    fn forward_motion(&self) -> Result<bool> {
        let latest = {
            let motion = self.motion.lock();
            if !motion.is_active() {
                return Ok(false);
            }
            motion.latest()
        };

        let mut forwarded = self.forwarded.lock();
        if *forwarded == Some(latest) {
            return Ok(false);
        }

        let mut controller = self.controller.lock();
        let bent = controller.update_pitch_bend(latest.pitch_bend);
        let amplified = controller.update_amplitude(latest.modulation);
        bent.and(amplified)?;
        *forwarded = Some(latest);
        Ok(true)
    }
}

struct Link {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

/// A running instrument.
///
/// All playback operations go through one lock, so a play or stop always
/// completes before the next one starts, no matter which thread calls it.
pub struct Session {
    shared: Arc<Shared>,
    link: Option<Link>,
}

impl Session {
    /// Start a session playing through `sink`.
    pub fn new(
        config: SessionConfig,
        sink: Box<dyn AudioSink>,
        haptics: Option<Box<dyn Haptics>>,
    ) -> Result<Self> {
        Self::with_controller(config, PlaybackController::new(sink, haptics))
    }

    /// Start a session from backends that may have failed to open.
    /// A missing audio output is replaced by [`Silent`], missing haptics disable pulses.
    pub fn with_outputs(
        config: SessionConfig,
        sink: Result<Box<dyn AudioSink>>,
        haptics: Result<Box<dyn Haptics>>,
    ) -> Result<Self> {
        let sink = sink.unwrap_or_else(|err| {
            error!("audio output unavailable, continuing silently: {}", err);
            Box::new(Silent)
        });
        let haptics = haptics
            .map_err(|err| warn!("haptics unavailable: {}", err))
            .ok();
        Self::new(config, sink, haptics)
    }

    pub fn with_controller(config: SessionConfig, mut controller: PlaybackController) -> Result<Self> {
        let rate = ensure_positive("link rate", config.link_rate_hz)?;

        controller.set_haptic_pulse(config.haptic_pulse);
        controller.switch_instrument(config.initial_mode);
        controller.update_amplitude(config.initial_amplitude)?;

        let mut motion = MotionMapper::new();
        if !config.motion_enabled {
            motion.stop();
        }
        // the resting position must not override the configured start values
        let resting = motion.latest();

        let shared = Arc::new(Shared {
            controller: Mutex::new(controller),
            motion: Mutex::new(motion),
            forwarded: Mutex::new(Some(resting)),
        });

        let link = spawn_link(Arc::clone(&shared), Duration::from_secs_f64(1.0 / rate))?;
        info!("session started, linking motion at {} Hz", rate);
        Ok(Self {
            shared,
            link: Some(link),
        })
    }

    pub fn play_note(&self, frequency: f64) -> Result<()> {
        self.shared.controller.lock().play_note(frequency)
    }

    pub fn start_continuous_note(&self, frequency: f64) -> Result<()> {
        self.shared.controller.lock().start_continuous_note(frequency)
    }

    pub fn stop_continuous_note(&self) {
        self.shared.controller.lock().stop_continuous_note()
    }

    pub fn switch_instrument(&self, mode: InstrumentMode) {
        self.shared.controller.lock().switch_instrument(mode)
    }

    pub fn update_pitch_bend(&self, semitones: f64) -> Result<()> {
        self.shared.controller.lock().update_pitch_bend(semitones)
    }

    pub fn update_amplitude(&self, amplitude: f64) -> Result<()> {
        self.shared.controller.lock().update_amplitude(amplitude)
    }

    /// Snapshot of the voice.
    pub fn state(&self) -> PlaybackState {
        *self.shared.controller.lock().state()
    }

    /// Feed an orientation sample from the motion sensor.
    /// The voice picks it up on the next link tick.
    pub fn push_orientation(&self, orientation: Orientation) -> Option<MotionParameters> {
        self.shared.motion.lock().push(orientation)
    }

    pub fn motion_parameters(&self) -> MotionParameters {
        self.shared.motion.lock().latest()
    }

    pub fn set_motion_enabled(&self, enabled: bool) {
        let mut motion = self.shared.motion.lock();
        if enabled {
            motion.start()
        } else {
            motion.stop()
        }
    }

    /// Return the motion parameters to rest.
    pub fn reset_motion(&self) {
        self.shared.motion.lock().reset()
    }

    /// Forward the latest motion parameters right away instead of waiting for the link.
    pub fn apply_motion(&self) -> Result<bool> {
        self.shared.forward_motion()
    }

    /// Stop the link thread and silence the voice. Called on drop as well.
    pub fn shutdown(&mut self) {
        if let Some(link) = self.link.take() {
            drop(link.stop);
            if link.thread.join().is_err() {
                error!("parameter link thread panicked");
            }
            self.shared.controller.lock().stop_continuous_note();
            info!("session stopped");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown()
    }
}

fn spawn_link(shared: Arc<Shared>, period: Duration) -> Result<Link> {
    let (stop, stopped) = bounded::<()>(0);
    let thread = thread::Builder::new()
        .name("parameter-link".into())
        .spawn(move || {
            let ticker = tick(period);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        match shared.forward_motion() {
                            Ok(true) => debug!("forwarded {:?}", shared.motion.lock().latest()),
                            Ok(false) => {}
                            Err(err) => warn!("could not apply motion: {}", err),
                        }
                    }
                    recv(stopped) -> _ => break,
                }
            }
        })
        .context(ResourceUnavailable {
            resource: "parameter link thread",
        })?;
    Ok(Link { stop, thread })
}
