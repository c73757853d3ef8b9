// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The three timbres the instrument can take on.

pub mod guitar;
pub mod piano;
pub mod violin;

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// Selects the generator algorithm and the note lengths used for playing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstrumentMode {
    Piano,
    Violin,
    Guitar,
}

/// Length in seconds of the looped buffer used for held notes.
pub const CONTINUOUS_NOTE_DURATION: f64 = 5.0;

impl InstrumentMode {
    pub const ALL: [InstrumentMode; 3] = [
        InstrumentMode::Piano,
        InstrumentMode::Violin,
        InstrumentMode::Guitar,
    ];

    /// Length in seconds of a single struck or plucked note.
    pub fn one_shot_duration(self) -> f64 {
        match self {
            InstrumentMode::Guitar => 2.0,
            InstrumentMode::Piano | InstrumentMode::Violin => 3.0,
        }
    }

    /// Whether a sounding note is regenerated when the pitch bend changes.
    pub fn follows_live_bend(self) -> bool {
        self == InstrumentMode::Violin
    }

    /// Whether a sounding note is regenerated when the amplitude changes.
    /// A guitar pluck is committed once it sounds.
    pub fn follows_live_amplitude(self) -> bool {
        matches!(self, InstrumentMode::Violin | InstrumentMode::Piano)
    }
}

impl Default for InstrumentMode {
    fn default() -> Self {
        InstrumentMode::Piano
    }
}

impl fmt::Display for InstrumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentMode::Piano => "piano",
            InstrumentMode::Violin => "violin",
            InstrumentMode::Guitar => "guitar",
        };
        f.write_str(name)
    }
}

/// ```
/// use perfect_instrument::instrument::InstrumentMode;
/// assert_eq!("Violin".parse::<InstrumentMode>(), Ok(InstrumentMode::Violin));
/// assert!("banjo".parse::<InstrumentMode>().is_err());
/// ```
impl FromStr for InstrumentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown instrument {:?}, expected piano, violin or guitar", s))
    }
}

/// What a timbre needs to know about the note it is rendering.
#[derive(Debug, Copy, Clone)]
pub struct NoteContext {
    /// Angular frequency of the bent note in rad/s.
    pub omega: f64,
    /// Total length of the note in seconds.
    pub duration: f64,
    /// Output level in `[0, 1]`.
    pub amplitude: f64,
}

/// A waveform generator evaluated at absolute times into the note.
pub trait Timbre {
    /// The mono sample `time` seconds into the note.
    /// Timbres with random components draw from `noise`.
    fn sample<R: Rng + ?Sized>(&self, note: &NoteContext, time: f64, noise: &mut R) -> f64;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(InstrumentMode::Piano.one_shot_duration(), 3.0);
        assert_eq!(InstrumentMode::Violin.one_shot_duration(), 3.0);
        assert_eq!(InstrumentMode::Guitar.one_shot_duration(), 2.0);
    }

    #[test]
    fn live_updates() {
        assert!(InstrumentMode::Violin.follows_live_bend());
        assert!(!InstrumentMode::Piano.follows_live_bend());
        assert!(!InstrumentMode::Guitar.follows_live_bend());

        assert!(InstrumentMode::Violin.follows_live_amplitude());
        assert!(InstrumentMode::Piano.follows_live_amplitude());
        assert!(!InstrumentMode::Guitar.follows_live_amplitude());
    }

    #[test]
    fn names_round_trip() {
        for mode in InstrumentMode::ALL.iter() {
            assert_eq!(mode.to_string().parse::<InstrumentMode>(), Ok(*mode));
        }
    }
}
