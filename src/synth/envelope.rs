// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Amplitude shapes applied to the raw waveforms.

/// An Attack-Decay-Sustain-Release envelope for a note of known length.
/// The amplitude first rises from zero to one over `attack` seconds,
/// then decays over an additional `decay` seconds to the `sustain` level where it is held
/// until `release` seconds before the end of the note, and then falls back to zero.
///
/// # Example
///
/// ```
/// use perfect_instrument::synth::envelope::*;
/// let e = ADSR {
///     attack: 0.25,
///     decay: 0.5,
///     sustain: 0.75,
///     release: 1.0,
/// };
/// assert_eq!(e.eval(0.0, 4.0), 0.0);
/// assert_eq!(e.eval(0.25, 4.0), 1.0);
/// assert_eq!(e.eval(0.5, 4.0), 0.875);
/// assert_eq!(e.eval(2.0, 4.0), 0.75);
/// assert_eq!(e.eval(3.5, 4.0), 0.375);
/// assert_eq!(e.eval(4.0, 4.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ADSR {
    /// Time in seconds to go from 0.0 to 1.0
    pub attack: f64,
    /// Time in seconds to go from 1.0 to `sustain`.
    pub decay: f64,
    /// Constant amplitude between decay and release.
    pub sustain: f64,
    /// Time in seconds to go from `sustain` to 0.0 at the end of the note.
    pub release: f64,
}

impl ADSR {
    /// Evaluate the envelope `time` seconds into a note lasting `duration` seconds.
    ///
    /// Attack and decay take precedence over the release, so notes shorter than
    /// `attack + decay + release` jump into the release ramp once the decay is over.
    pub fn eval(&self, time: f64, duration: f64) -> f64 {
        if time < self.attack {
            time / self.attack
        } else if time < self.attack + self.decay {
            let progress = (time - self.attack) / self.decay;
            1.0 - (1.0 - self.sustain) * progress
        } else if time > duration - self.release {
            self.sustain * (duration - time) / self.release
        } else {
            self.sustain
        }
    }
}

/// Linear fade-in that stays at full level once `attack` seconds have passed.
///
/// ```
/// # use perfect_instrument::synth::envelope::Swell;
/// let swell = Swell { attack: 0.5 };
/// assert_eq!(swell.eval(0.0), 0.0);
/// assert_eq!(swell.eval(0.25), 0.5);
/// assert_eq!(swell.eval(3.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Swell {
    pub attack: f64,
}

impl Swell {
    pub fn eval(&self, time: f64) -> f64 {
        (time / self.attack).min(1.0)
    }
}

/// Exponential decay `exp(-rate * t)`, the energy loss of a struck or plucked string.
#[derive(Debug, Clone)]
pub struct Decay {
    /// Decay rate per second.
    pub rate: f64,
}

impl Decay {
    pub fn eval(&self, time: f64) -> f64 {
        (-self.rate * time).exp()
    }
}

/// Linearly falling ramp from 1.0 at `t = 0` down to 0.0 at `t = length`, zero afterwards.
#[derive(Debug, Clone)]
pub struct Transient {
    pub length: f64,
}

impl Transient {
    pub fn eval(&self, time: f64) -> f64 {
        if time < self.length {
            (self.length - time) / self.length
        } else {
            0.0
        }
    }
}
