// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains all the parts converting a note request into wave data.

pub mod envelope;
pub mod harmonics;

use std::f64::consts::PI;

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ensure_positive, Result};
use crate::instrument::guitar::Guitar;
use crate::instrument::piano::Piano;
use crate::instrument::violin::Violin;
use crate::instrument::{InstrumentMode, NoteContext, Timbre};
use crate::tuning::bend_ratio;
use crate::wave::{frames_for, AudioBuffer, Stereo, SAMPLE_RATE};

/// Largest pitch bend in semitones, in either direction.
pub const MAX_PITCH_BEND: f64 = 2.0;

/// Clamp an amplitude into `[0, 1]`. `NaN` becomes silence.
pub fn clamp_amplitude(amplitude: f64) -> f64 {
    if amplitude.is_nan() {
        0.0
    } else {
        amplitude.max(0.0).min(1.0)
    }
}

/// Clamp a pitch bend into `[-2, 2]` semitones. `NaN` becomes no bend.
pub fn clamp_pitch_bend(semitones: f64) -> f64 {
    if semitones.is_nan() {
        0.0
    } else {
        semitones.max(-MAX_PITCH_BEND).min(MAX_PITCH_BEND)
    }
}

/// Everything needed to render a single note.
///
/// Amplitude and pitch bend are clamped on construction and never rejected.
///
/// ```
/// use perfect_instrument::instrument::InstrumentMode;
/// use perfect_instrument::synth::SynthesisRequest;
///
/// let request = SynthesisRequest::new(InstrumentMode::Violin, 440.0, 5.0)
///     .with_amplitude(1.5)
///     .with_pitch_bend(-3.0);
/// assert_eq!(request.amplitude(), 1.0);
/// assert_eq!(request.pitch_bend(), -2.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SynthesisRequest {
    mode: InstrumentMode,
    frequency: f64,
    duration: f64,
    amplitude: f64,
    pitch_bend: f64,
}

impl SynthesisRequest {
    /// A request at half amplitude without pitch bend.
    pub fn new(mode: InstrumentMode, frequency: f64, duration: f64) -> Self {
        Self {
            mode,
            frequency,
            duration,
            amplitude: 0.5,
            pitch_bend: 0.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = clamp_amplitude(amplitude);
        self
    }

    pub fn with_pitch_bend(mut self, semitones: f64) -> Self {
        self.pitch_bend = clamp_pitch_bend(semitones);
        self
    }

    pub fn mode(&self) -> InstrumentMode {
        self.mode
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn pitch_bend(&self) -> f64 {
        self.pitch_bend
    }

    /// Frequency after applying the pitch bend.
    pub fn effective_frequency(&self) -> f64 {
        self.frequency * bend_ratio(self.pitch_bend)
    }

    /// Number of stereo frames the rendered buffer will hold.
    pub fn frame_count(&self) -> usize {
        frames_for(self.duration)
    }
}

/// Renders notes of any instrument into stereo buffers.
///
/// All randomness (the guitar pick noise) is drawn from the owned generator,
/// so a seeded generator yields reproducible buffers.
pub struct WaveformSynthesizer<R = StdRng> {
    piano: Piano,
    violin: Violin,
    guitar: Guitar,
    noise: R,
}

impl WaveformSynthesizer<StdRng> {
    /// A synthesizer seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A synthesizer producing the same noise on every run.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for WaveformSynthesizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WaveformSynthesizer<R> {
    pub fn with_rng(noise: R) -> Self {
        Self {
            piano: Piano::default(),
            violin: Violin::default(),
            guitar: Guitar::default(),
            noise,
        }
    }

    /// Render the requested note.
    ///
    /// Fails with `InvalidParameter` for non-positive frequencies or durations
    /// and with `GenerationFailure` if the buffer cannot be allocated.
    pub fn generate(&mut self, request: &SynthesisRequest) -> Result<AudioBuffer> {
        ensure_positive("frequency", request.frequency)?;
        ensure_positive("duration", request.duration)?;

        let mut buffer = AudioBuffer::silent(request.frame_count())?;
        let note = NoteContext {
            omega: 2.0 * PI * request.effective_frequency(),
            duration: request.duration,
            amplitude: request.amplitude,
        };
        trace!(
            "rendering {} frames of {} at {:.2} Hz",
            buffer.len(),
            request.mode,
            request.effective_frequency()
        );

        let noise = &mut self.noise;
        match request.mode {
            InstrumentMode::Piano => render(&self.piano, &note, buffer.frames_mut(), noise),
            InstrumentMode::Violin => render(&self.violin, &note, buffer.frames_mut(), noise),
            InstrumentMode::Guitar => render(&self.guitar, &note, buffer.frames_mut(), noise),
        }
        Ok(buffer)
    }
}

/// Fill `output` with the timbre, duplicating the mono signal onto both channels.
fn render<T: Timbre, R: Rng + ?Sized>(
    timbre: &T,
    note: &NoteContext,
    output: &mut [Stereo<f64>],
    noise: &mut R,
) {
    let sample_rate = SAMPLE_RATE as f64;
    for (frame, out) in output.iter_mut().enumerate() {
        let time = frame as f64 / sample_rate;
        *out = Stereo::mono(timbre.sample(note, time, noise));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    fn sample_at(buffer: &AudioBuffer, time: f64) -> f64 {
        buffer.frames()[(time * SAMPLE_RATE as f64).round() as usize].left
    }

    #[test]
    fn frame_count_follows_duration() {
        let mut synth = WaveformSynthesizer::seeded(1);
        for &(mode, duration) in &[
            (InstrumentMode::Piano, 3.0),
            (InstrumentMode::Violin, 0.25),
            (InstrumentMode::Guitar, 2.0),
            (InstrumentMode::Piano, 0.1234567),
        ] {
            let request = SynthesisRequest::new(mode, 261.63, duration);
            let buffer = synth.generate(&request).unwrap();
            assert_eq!(buffer.len(), (44100.0 * duration as f64).round() as usize);
        }
    }

    #[test]
    fn channels_are_identical() {
        let mut synth = WaveformSynthesizer::seeded(2);
        for mode in InstrumentMode::ALL.iter() {
            let request = SynthesisRequest::new(*mode, 329.63, 0.5).with_amplitude(0.9);
            let buffer = synth.generate(&request).unwrap();
            assert!(buffer.frames().iter().all(|f| f.left == f.right));
        }
    }

    #[test]
    fn piano_scenario() {
        let mut synth = WaveformSynthesizer::seeded(3);
        let request = SynthesisRequest::new(InstrumentMode::Piano, 440.0, 3.0).with_amplitude(1.0);
        let buffer = synth.generate(&request).unwrap();
        assert_eq!(buffer.len(), 132300);
        assert_eq!(buffer.frames()[0].left, 0.0);

        let piano = Piano::default();
        let omega = 2.0 * PI * 440.0;
        let expected = additive_at(&piano, omega, 1.0) * 0.6 * 0.35;
        assert!((sample_at(&buffer, 1.0) - expected).abs() < 1e-9);
    }

    fn additive_at(piano: &Piano, omega: f64, time: f64) -> f64 {
        crate::synth::harmonics::additive(&piano.partials, omega, time)
    }

    #[test]
    fn violin_starts_at_zero_for_any_amplitude() {
        let mut synth = WaveformSynthesizer::seeded(4);
        for &amplitude in &[0.0, 0.3, 1.0] {
            let request =
                SynthesisRequest::new(InstrumentMode::Violin, 880.0, 0.1).with_amplitude(amplitude);
            assert_eq!(synth.generate(&request).unwrap().frames()[0].left, 0.0);
        }
    }

    #[test]
    fn pitch_bend_raises_frequency() {
        let request = SynthesisRequest::new(InstrumentMode::Piano, 440.0, 1.0).with_pitch_bend(2.0);
        assert!((request.effective_frequency() - 493.8833).abs() < 1e-3);
    }

    #[test]
    fn seeded_guitar_is_reproducible() {
        let request = SynthesisRequest::new(InstrumentMode::Guitar, 110.0, 0.05);
        let a = WaveformSynthesizer::seeded(9).generate(&request).unwrap();
        let b = WaveformSynthesizer::seeded(9).generate(&request).unwrap();
        assert_eq!(a, b);
        // pick noise makes the very first frame audible
        assert_ne!(a.frames()[0].left, 0.0);
    }

    #[test]
    fn rejects_non_positive_input() {
        let mut synth = WaveformSynthesizer::seeded(5);
        let bad_frequency = SynthesisRequest::new(InstrumentMode::Piano, 0.0, 1.0);
        let bad_duration = SynthesisRequest::new(InstrumentMode::Guitar, 440.0, -1.0);
        assert!(matches!(
            synth.generate(&bad_frequency),
            Err(Error::InvalidParameter { name: "frequency", .. })
        ));
        assert!(matches!(
            synth.generate(&bad_duration),
            Err(Error::InvalidParameter { name: "duration", .. })
        ));
    }

    #[test]
    fn clamping() {
        assert_eq!(clamp_pitch_bend(5.0), 2.0);
        assert_eq!(clamp_pitch_bend(-5.0), -2.0);
        assert_eq!(clamp_pitch_bend(std::f64::NAN), 0.0);
        assert_eq!(clamp_amplitude(-1.0), 0.0);
        assert_eq!(clamp_amplitude(0.25), 0.25);
    }
}
