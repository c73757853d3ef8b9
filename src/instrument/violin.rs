// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A bowed string: a sawtooth with vibrato that swells in and then holds.

use std::f64::consts::PI;

use rand::Rng;

use super::{NoteContext, Timbre};
use crate::synth::envelope::Swell;
use crate::synth::harmonics::sawtooth;

#[derive(Debug, Clone)]
pub struct Violin {
    /// Vibrato rate in Hz.
    pub vibrato_rate: f64,
    /// Relative frequency deviation of the vibrato.
    pub vibrato_depth: f64,
    /// Number of sawtooth harmonics.
    pub harmonics: u32,
    /// Bow attack.
    pub swell: Swell,
    pub gain: f64,
}

impl Default for Violin {
    fn default() -> Self {
        Self {
            vibrato_rate: 5.0,
            vibrato_depth: 0.005,
            harmonics: 8,
            swell: Swell { attack: 0.1 },
            gain: 0.25,
        }
    }
}

impl Violin {
    /// Angular frequency at `time`, modulated by the vibrato.
    pub fn vibrato_omega(&self, omega: f64, time: f64) -> f64 {
        let vibrato = (2.0 * PI * self.vibrato_rate * time).sin() * self.vibrato_depth;
        omega * (1.0 + vibrato)
    }
}

impl Timbre for Violin {
    fn sample<R: Rng + ?Sized>(&self, note: &NoteContext, time: f64, _noise: &mut R) -> f64 {
        let omega = self.vibrato_omega(note.omega, time);
        sawtooth(self.harmonics, omega, time) * self.swell.eval(time) * note.amplitude * self.gain
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn vibrato_stays_within_half_a_percent() {
        let violin = Violin::default();
        let omega = 2.0 * PI * 440.0;
        for i in 0..1000 {
            let modulated = violin.vibrato_omega(omega, i as f64 * 0.001);
            assert!((modulated / omega - 1.0).abs() <= 0.005 + 1e-12);
        }
    }

    #[test]
    fn bow_swells_in() {
        let violin = Violin::default();
        let note = NoteContext {
            omega: 2.0 * PI * 440.0,
            duration: 5.0,
            amplitude: 1.0,
        };
        let mut rng = StepRng::new(0, 1);
        assert_eq!(violin.sample(&note, 0.0, &mut rng), 0.0);

        // after the swell the envelope no longer changes the waveform
        let t = 0.5123;
        let expected = sawtooth(8, violin.vibrato_omega(note.omega, t), t) * 0.25;
        assert!((violin.sample(&note, t, &mut rng) - expected).abs() < 1e-12);
    }
}
