// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A plucked string whose upper harmonics die away faster than the fundamental.

use rand::Rng;

use super::{NoteContext, Timbre};
use crate::synth::envelope::{Decay, Transient};

#[derive(Debug, Clone)]
pub struct Guitar {
    /// Decay of the whole string.
    pub pluck: Decay,
    /// Number of harmonics, the `n`-th weighted by `1/n`.
    pub harmonics: u32,
    /// Additional decay rate per harmonic number.
    pub harmonic_damping: f64,
    /// Peak level of the pick noise.
    pub pick_noise: f64,
    /// Fade-out of the pick noise.
    pub pick_transient: Transient,
    pub gain: f64,
}

impl Default for Guitar {
    fn default() -> Self {
        Self {
            pluck: Decay { rate: 1.5 },
            harmonics: 8,
            harmonic_damping: 0.8,
            pick_noise: 0.05,
            pick_transient: Transient { length: 0.02 },
            gain: 0.5,
        }
    }
}

impl Guitar {
    /// The deterministic part of the pluck, without pick noise and output scaling.
    pub fn string(&self, omega: f64, time: f64) -> f64 {
        let partials: f64 = (1..=self.harmonics)
            .map(|n| {
                let n = n as f64;
                let damping = (-n * self.harmonic_damping * time).exp();
                (omega * n * time).sin() * damping / n
            })
            .sum();
        partials * self.pluck.eval(time)
    }

    /// Uniform pick noise, fading out over the transient window.
    pub fn pick<R: Rng + ?Sized>(&self, time: f64, noise: &mut R) -> f64 {
        let brightness = self.pick_transient.eval(time);
        if brightness > 0.0 {
            noise.gen_range(-self.pick_noise..=self.pick_noise) * brightness
        } else {
            0.0
        }
    }
}

impl Timbre for Guitar {
    fn sample<R: Rng + ?Sized>(&self, note: &NoteContext, time: f64, noise: &mut R) -> f64 {
        self.string(note.omega, time) * note.amplitude * self.gain + self.pick(time, noise)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    #[test]
    fn pick_noise_is_bounded_and_brief() {
        let guitar = Guitar::default();
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..2000 {
            let t = i as f64 / 44100.0;
            let pick = guitar.pick(t, &mut rng);
            assert!(pick.abs() <= 0.05 * guitar.pick_transient.eval(t) + 1e-12);
            if t >= 0.02 {
                assert_eq!(pick, 0.0);
            }
        }
    }

    #[test]
    fn same_seed_same_pluck() {
        let guitar = Guitar::default();
        let note = NoteContext {
            omega: 2.0 * PI * 110.0,
            duration: 2.0,
            amplitude: 0.8,
        };
        let render = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..900)
                .map(|i| guitar.sample(&note, i as f64 / 44100.0, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(render(3), render(3));
        assert_ne!(render(3), render(4));
    }

    #[test]
    fn upper_harmonics_fade_first() {
        let guitar = Guitar::default();
        let omega = 2.0 * PI * 110.0;
        let peak = |from: f64| {
            (0..4410)
                .map(|i| guitar.string(omega, from + i as f64 / 44100.0).abs())
                .fold(0.0, f64::max)
        };
        assert!(peak(1.0) < peak(0.0));
        assert!(peak(1.5) < peak(1.0));
    }
}
