// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A struck string with a bright harmonic spectrum.

use rand::Rng;

use super::{NoteContext, Timbre};
use crate::synth::envelope::ADSR;
use crate::synth::harmonics::{additive, Partial};

/// Parameters of the piano tone.
#[derive(Debug, Clone)]
pub struct Piano {
    /// Volume shape of every note.
    pub envelope: ADSR,
    /// Relative strength of the overtones.
    pub partials: Vec<Partial>,
    /// Output gain applied after the envelope.
    pub gain: f64,
}

impl Default for Piano {
    fn default() -> Self {
        Self {
            envelope: ADSR {
                attack: 0.005,
                decay: 0.8,
                sustain: 0.6,
                release: 1.0,
            },
            partials: vec![
                Partial::new(1.0, 1.0),
                Partial::new(2.0, 0.6),
                Partial::new(3.0, 0.4),
                Partial::new(4.0, 0.25),
                Partial::new(5.0, 0.15),
                Partial::new(7.0, 0.08),
            ],
            gain: 0.35,
        }
    }
}

impl Timbre for Piano {
    fn sample<R: Rng + ?Sized>(&self, note: &NoteContext, time: f64, _noise: &mut R) -> f64 {
        let envelope = self.envelope.eval(time, note.duration);
        additive(&self.partials, note.omega, time) * envelope * note.amplitude * self.gain
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::mock::StepRng;
    use std::f64::consts::PI;

    #[test]
    fn silent_at_onset() {
        let note = NoteContext {
            omega: 2.0 * PI * 440.0,
            duration: 3.0,
            amplitude: 1.0,
        };
        assert_eq!(Piano::default().sample(&note, 0.0, &mut StepRng::new(0, 1)), 0.0);
    }

    #[test]
    fn sustain_scales_output() {
        let piano = Piano::default();
        let note = NoteContext {
            omega: 2.0 * PI * 440.0,
            duration: 3.0,
            amplitude: 0.5,
        };
        let t = 1.0 + 1.0 / 1760.0;
        let raw = additive(&piano.partials, note.omega, t);
        let sample = piano.sample(&note, t, &mut StepRng::new(0, 1));
        assert!((sample - raw * 0.6 * 0.5 * 0.35).abs() < 1e-12);
    }
}
