// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The single voice of the instrument: what is playing and how to change it.

use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::Result;
use crate::instrument::{InstrumentMode, CONTINUOUS_NOTE_DURATION};
use crate::output::{AudioSink, Haptics};
use crate::quantizer::{HapticTriggerState, NoteQuantizer};
use crate::synth::{clamp_amplitude, clamp_pitch_bend, SynthesisRequest, WaveformSynthesizer};
use crate::tuning::bend_ratio;

/// What the output sink is currently doing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    /// A struck note plays once.
    PlayingOneShot,
    /// A held note loops until stopped.
    PlayingLooped,
}

/// Observable state of the voice.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_frequency: f64,
    /// Always within `[0, 1]`.
    pub amplitude: f64,
    /// Always within `[-2, 2]` semitones.
    pub pitch_bend: f64,
    pub mode: InstrumentMode,
    pub transport: Transport,
}

impl PlaybackState {
    /// Whether a buffer is scheduled on the sink.
    pub fn is_playing(&self) -> bool {
        self.transport != Transport::Stopped
    }

    /// The sounding frequency including the pitch bend.
    pub fn effective_frequency(&self) -> f64 {
        self.current_frequency * bend_ratio(self.pitch_bend)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_frequency: 440.0,
            amplitude: 0.5,
            pitch_bend: 0.0,
            mode: InstrumentMode::default(),
            transport: Transport::Stopped,
        }
    }
}

/// Strength of the pulse fired when the pitch lands on a note.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HapticPulse {
    pub intensity: f64,
    pub sharpness: f64,
}

impl Default for HapticPulse {
    fn default() -> Self {
        Self {
            intensity: 0.6,
            sharpness: 0.8,
        }
    }
}

/// Owns the voice state and is the only one talking to the audio sink.
///
/// Every operation renders its buffer before touching the sink, so a failed
/// render leaves the previous sound and state untouched.
pub struct PlaybackController<R = StdRng> {
    state: PlaybackState,
    synth: WaveformSynthesizer<R>,
    sink: Box<dyn AudioSink>,
    haptics: Option<Box<dyn Haptics>>,
    quantizer: NoteQuantizer,
    trigger: HapticTriggerState,
    pulse: HapticPulse,
}

impl PlaybackController<StdRng> {
    pub fn new(sink: Box<dyn AudioSink>, haptics: Option<Box<dyn Haptics>>) -> Self {
        Self::with_synth(WaveformSynthesizer::new(), sink, haptics)
    }
}

impl<R: Rng> PlaybackController<R> {
    pub fn with_synth(
        synth: WaveformSynthesizer<R>,
        sink: Box<dyn AudioSink>,
        haptics: Option<Box<dyn Haptics>>,
    ) -> Self {
        if haptics.is_none() {
            warn!("no haptic backend, pulses are disabled");
        }
        Self {
            state: PlaybackState::default(),
            synth,
            sink,
            haptics,
            quantizer: NoteQuantizer::default(),
            trigger: HapticTriggerState::default(),
            pulse: HapticPulse::default(),
        }
    }

    /// Use a different pulse strength.
    pub fn set_haptic_pulse(&mut self, pulse: HapticPulse) {
        self.pulse = pulse;
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn haptic_trigger(&self) -> &HapticTriggerState {
        &self.trigger
    }

    /// Strike a note once, replacing whatever sounded before.
    pub fn play_note(&mut self, frequency: f64) -> Result<()> {
        let duration = self.state.mode.one_shot_duration();
        self.start(frequency, duration, false)?;
        info!("playing note: {:.2} Hz", frequency);
        Ok(())
    }

    /// Hold a note, looping its buffer until [`Self::stop_continuous_note`].
    pub fn start_continuous_note(&mut self, frequency: f64) -> Result<()> {
        self.start(frequency, CONTINUOUS_NOTE_DURATION, true)?;
        info!("starting continuous note: {:.2} Hz", frequency);
        Ok(())
    }

    /// Silence the voice.
    pub fn stop_continuous_note(&mut self) {
        self.stop_sound();
    }

    /// Set the pitch bend, clamped to `[-2, 2]` semitones.
    ///
    /// A sounding violin is re-rendered at the new pitch right away.
    /// The haptic check runs against the bent frequency in any case.
    pub fn update_pitch_bend(&mut self, semitones: f64) -> Result<()> {
        self.state.pitch_bend = clamp_pitch_bend(semitones);
        let result = if self.state.is_playing() && self.state.mode.follows_live_bend() {
            debug!("re-bowing at {:+.3} semitones", self.state.pitch_bend);
            self.start_continuous_note(self.state.current_frequency)
        } else {
            Ok(())
        };
        self.check_haptics();
        result
    }

    /// Set the amplitude, clamped to `[0, 1]`.
    ///
    /// A sounding violin or piano is re-rendered as a held note at the new level,
    /// a guitar pluck keeps its original level.
    pub fn update_amplitude(&mut self, amplitude: f64) -> Result<()> {
        self.state.amplitude = clamp_amplitude(amplitude);
        if self.state.is_playing() && self.state.mode.follows_live_amplitude() {
            debug!("re-rendering at amplitude {:.3}", self.state.amplitude);
            self.start_continuous_note(self.state.current_frequency)
        } else {
            Ok(())
        }
    }

    /// Stop any sound and change the timbre for subsequent notes.
    pub fn switch_instrument(&mut self, mode: InstrumentMode) {
        self.stop_sound();
        if self.state.mode != mode {
            debug!("switching instrument {} -> {}", self.state.mode, mode);
        }
        self.state.mode = mode;
    }

    /// Render a note and hand it to the sink. Nothing changes if rendering fails.
    fn start(&mut self, frequency: f64, duration: f64, looped: bool) -> Result<()> {
        let request = SynthesisRequest::new(self.state.mode, frequency, duration)
            .with_amplitude(self.state.amplitude)
            .with_pitch_bend(self.state.pitch_bend);
        let buffer = self.synth.generate(&request).map_err(|err| {
            error!("dropping {} note at {} Hz: {}", self.state.mode, frequency, err);
            err
        })?;

        self.state.current_frequency = frequency;
        self.check_haptics();
        self.stop_sound();
        match self.sink.schedule(buffer, looped) {
            Ok(()) => {
                self.state.transport = if looped {
                    Transport::PlayingLooped
                } else {
                    Transport::PlayingOneShot
                };
                Ok(())
            }
            Err(err) => {
                error!("audio output rejected the buffer: {}", err);
                Err(err)
            }
        }
    }

    fn stop_sound(&mut self) {
        if self.state.is_playing() {
            self.sink.stop();
            self.state.transport = Transport::Stopped;
            debug!("stopped sound");
        }
    }

    fn check_haptics(&mut self) {
        let frequency = self.state.effective_frequency();
        if !self.quantizer.should_trigger(frequency, &mut self.trigger) {
            return;
        }
        if let Some(haptics) = self.haptics.as_mut() {
            trace!("pulse for {:.2} Hz", frequency);
            if let Err(err) =
                haptics.fire_transient_pulse(self.pulse.intensity, self.pulse.sharpness)
            {
                warn!("haptic playback error: {}", err);
            }
        }
    }
}

impl<R> Drop for PlaybackController<R> {
    fn drop(&mut self) {
        if self.state.is_playing() {
            self.sink.stop();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::output::testing::{RecordingHaptics, RecordingSink, SinkCall};

    fn controller() -> (PlaybackController, RecordingSink, RecordingHaptics) {
        let sink = RecordingSink::default();
        let haptics = RecordingHaptics::default();
        let controller = PlaybackController::with_synth(
            WaveformSynthesizer::seeded(11),
            Box::new(sink.clone()),
            Some(Box::new(haptics.clone())),
        );
        (controller, sink, haptics)
    }

    #[test]
    fn piano_note_is_three_seconds() {
        let (mut c, sink, _) = controller();
        c.play_note(440.0).unwrap();
        assert_eq!(c.state().transport, Transport::PlayingOneShot);
        assert_eq!(
            sink.calls(),
            vec![SinkCall::Schedule {
                frames: 132300,
                looped: false
            }]
        );
        let buffer = sink.last_buffer().unwrap();
        assert_eq!(buffer.frames()[0].left, 0.0);
    }

    #[test]
    fn guitar_note_is_two_seconds() {
        let (mut c, sink, _) = controller();
        c.switch_instrument(InstrumentMode::Guitar);
        c.play_note(110.0).unwrap();
        assert_eq!(sink.last_buffer().unwrap().len(), 88200);
    }

    #[test]
    fn new_note_stops_the_previous_one() {
        let (mut c, sink, _) = controller();
        c.play_note(440.0).unwrap();
        c.play_note(220.0).unwrap();
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Schedule {
                    frames: 132300,
                    looped: false
                },
                SinkCall::Stop,
                SinkCall::Schedule {
                    frames: 132300,
                    looped: false
                },
            ]
        );
    }

    #[test]
    fn continuous_note_loops_until_stopped() {
        let (mut c, sink, _) = controller();
        c.switch_instrument(InstrumentMode::Violin);
        c.start_continuous_note(600.0).unwrap();
        assert_eq!(c.state().transport, Transport::PlayingLooped);
        assert_eq!(
            sink.calls(),
            vec![SinkCall::Schedule {
                frames: 220500,
                looped: true
            }]
        );
        c.stop_continuous_note();
        assert_eq!(c.state().transport, Transport::Stopped);
        assert_eq!(sink.calls().last(), Some(&SinkCall::Stop));
    }

    #[test]
    fn parameters_are_clamped() {
        let (mut c, _, _) = controller();
        c.update_pitch_bend(5.0).unwrap();
        assert_eq!(c.state().pitch_bend, 2.0);
        c.update_amplitude(-1.0).unwrap();
        assert_eq!(c.state().amplitude, 0.0);
    }

    #[test]
    fn violin_follows_bend_live() {
        let (mut c, sink, _) = controller();
        c.switch_instrument(InstrumentMode::Violin);
        c.start_continuous_note(440.0).unwrap();
        c.update_pitch_bend(1.0).unwrap();
        let calls = sink.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[2],
            SinkCall::Schedule {
                frames: 220500,
                looped: true
            }
        );
    }

    #[test]
    fn piano_ignores_bend_but_follows_amplitude() {
        let (mut c, sink, _) = controller();
        c.play_note(440.0).unwrap();
        c.update_pitch_bend(1.0).unwrap();
        assert_eq!(sink.calls().len(), 1);

        c.update_amplitude(0.9).unwrap();
        assert_eq!(c.state().transport, Transport::PlayingLooped);
        assert_eq!(
            sink.calls().last(),
            Some(&SinkCall::Schedule {
                frames: 220500,
                looped: true
            })
        );
    }

    #[test]
    fn guitar_ignores_live_amplitude() {
        let (mut c, sink, _) = controller();
        c.switch_instrument(InstrumentMode::Guitar);
        c.play_note(82.41).unwrap();
        c.update_amplitude(1.0).unwrap();
        c.update_pitch_bend(-1.0).unwrap();
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(c.state().amplitude, 1.0);
    }

    #[test]
    fn nothing_regenerates_while_stopped() {
        let (mut c, sink, _) = controller();
        c.switch_instrument(InstrumentMode::Violin);
        c.update_pitch_bend(1.5).unwrap();
        c.update_amplitude(0.7).unwrap();
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn switching_instrument_stops_playback() {
        let (mut c, sink, _) = controller();
        c.play_note(440.0).unwrap();
        c.switch_instrument(InstrumentMode::Violin);
        assert_eq!(c.state().transport, Transport::Stopped);
        assert_eq!(c.state().mode, InstrumentMode::Violin);
        assert_eq!(sink.calls().len(), 2);
        assert_eq!(sink.calls()[1], SinkCall::Stop);
    }

    #[test]
    fn invalid_frequency_keeps_previous_state() {
        let (mut c, sink, haptics) = controller();
        c.switch_instrument(InstrumentMode::Violin);
        c.start_continuous_note(440.0).unwrap();
        let trigger = c.haptic_trigger().clone();

        assert!(c.play_note(0.0).is_err());
        assert!(c.start_continuous_note(-3.0).is_err());
        assert_eq!(c.state().transport, Transport::PlayingLooped);
        assert_eq!(c.state().current_frequency, 440.0);
        assert_eq!(c.haptic_trigger(), &trigger);
        assert_eq!(haptics.count(), 1);
        assert_eq!(sink.calls().len(), 1);

        // the voice still re-renders at the last good pitch
        c.update_amplitude(0.9).unwrap();
        c.update_pitch_bend(0.5).unwrap();
        assert_eq!(c.state().current_frequency, 440.0);
        assert_eq!(sink.calls().len(), 5);
    }

    #[test]
    fn sink_failure_leaves_voice_stopped() {
        let (mut c, sink, _) = controller();
        c.play_note(440.0).unwrap();
        *sink.fail.lock() = true;
        assert!(c.play_note(220.0).is_err());
        assert_eq!(c.state().transport, Transport::Stopped);
    }

    #[test]
    fn haptics_fire_once_per_note() {
        let (mut c, _, haptics) = controller();
        c.play_note(440.0).unwrap();
        c.play_note(440.0).unwrap();
        assert_eq!(haptics.count(), 1);
        assert_eq!(haptics.pulses.lock()[0], (0.6, 0.8));

        // bending by a full semitone lands on A#4
        c.update_pitch_bend(1.0).unwrap();
        assert_eq!(haptics.count(), 2);

        // a quarter tone is off the scale and re-arms the trigger
        c.update_pitch_bend(0.5).unwrap();
        assert_eq!(c.haptic_trigger().last_quantized_note(), None);
        c.update_pitch_bend(1.0).unwrap();
        assert_eq!(haptics.count(), 3);
    }

    #[test]
    fn off_scale_frequencies_do_not_pulse() {
        let (mut c, _, haptics) = controller();
        c.switch_instrument(InstrumentMode::Violin);
        c.start_continuous_note(452.0).unwrap();
        assert_eq!(haptics.count(), 0);
    }

    #[test]
    fn missing_haptics_still_plays() {
        let sink = RecordingSink::default();
        let mut c = PlaybackController::with_synth(
            WaveformSynthesizer::seeded(1),
            Box::new(sink.clone()),
            None,
        );
        c.play_note(440.0).unwrap();
        assert!(c.state().is_playing());
        assert_eq!(sink.calls().len(), 1);
    }
}
