// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::note::*;

/// Defines the tuning of an instrument by assinging a frequency to a certain note.
/// This defines the frequencies of all other notes at a standard tuning of 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use perfect_instrument::note::*;
/// use perfect_instrument::tuning::*;
/// assert_eq!(Tuning::default().frequency(Note::from_midi(57)), 220.0);
/// assert_eq!(Tuning::default().frequency(Note::from_midi(81)), 880.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub reference_note: Note,
    pub reference_frequency: f64,
}

impl Tuning {
    /// Return the frequency of a note relative to this tuning.
    pub fn frequency(&self, other: Note) -> f64 {
        self.shifted(other.index() - self.reference_note.index())
    }

    /// Frequency lying `semitones` half-tones away from the reference note.
    pub fn shifted(&self, semitones: i32) -> f64 {
        self.reference_frequency * bend_ratio(semitones as f64)
    }
}

/// Default concert tuning, where A4 corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_note: Note::from_midi(69),
            reference_frequency: 440.0,
        }
    }
}

/// Frequency ratio of a (possibly fractional) number of semitones.
///
/// ```
/// # use perfect_instrument::tuning::bend_ratio;
/// assert_eq!(bend_ratio(0.0), 1.0);
/// assert_eq!(bend_ratio(12.0), 2.0);
/// assert_eq!(bend_ratio(-24.0), 0.25);
/// ```
pub fn bend_ratio(semitones: f64) -> f64 {
    2.0f64.powf(semitones / 12.0)
}
