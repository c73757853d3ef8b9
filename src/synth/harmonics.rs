// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Additive synthesis: tones as weighted sums of sine partials.

/// A single sine partial at `multiple` times the base frequency.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Partial {
    pub multiple: f64,
    pub weight: f64,
}

impl Partial {
    pub const fn new(multiple: f64, weight: f64) -> Self {
        Self { multiple, weight }
    }

    /// The value of this partial at `time` for a base angular frequency `omega` (rad/s).
    pub fn eval(&self, omega: f64, time: f64) -> f64 {
        (omega * self.multiple * time).sin() * self.weight
    }
}

/// Sum all partials at `time`.
///
/// ```
/// use perfect_instrument::synth::harmonics::*;
/// let partials = [Partial::new(1.0, 1.0), Partial::new(2.0, 0.5)];
/// assert_eq!(additive(&partials, 440.0, 0.0), 0.0);
/// ```
pub fn additive(partials: &[Partial], omega: f64, time: f64) -> f64 {
    partials.iter().map(|p| p.eval(omega, time)).sum()
}

/// Band-limited sawtooth built from the first `harmonics` terms of its Fourier series,
/// the `n`-th harmonic weighted by `1/n`.
pub fn sawtooth(harmonics: u32, omega: f64, time: f64) -> f64 {
    (1..=harmonics)
        .map(|n| {
            let n = n as f64;
            (omega * n * time).sin() / n
        })
        .sum()
}
