// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Snapping continuous frequencies to the tempered scale, for deciding
//! when a sliding pitch passes over a "real" note.

use lazy_static::lazy_static;

use crate::note::Note;
use crate::tuning::Tuning;

/// Lowest key of an 88 key piano (A0).
pub const LOWEST_MIDI_NOTE: u8 = 21;
/// Highest key of an 88 key piano (C8).
pub const HIGHEST_MIDI_NOTE: u8 = 108;

/// A frequency at most this many Hz away from a note counts as hitting it.
pub const HAPTIC_TRIGGER_DISTANCE: f64 = 2.0;

lazy_static! {
    /// Frequencies of all piano keys in concert tuning.
    pub static ref PIANO_KEYS: MidiFrequencyTable = MidiFrequencyTable::new(Tuning::default());
}

/// Ordered frequencies of the MIDI notes 21 to 108.
#[derive(Debug, Clone)]
pub struct MidiFrequencyTable {
    frequencies: Vec<f64>,
}

#[allow(clippy::len_without_is_empty)]
impl MidiFrequencyTable {
    pub fn new(tuning: Tuning) -> Self {
        let frequencies = (LOWEST_MIDI_NOTE..=HIGHEST_MIDI_NOTE)
            .map(|midi| tuning.frequency(Note::from_midi(midi)))
            .collect();
        Self { frequencies }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frequency(&self, index: usize) -> Option<f64> {
        self.frequencies.get(index).copied()
    }

    /// The note at a table index.
    pub fn note(&self, index: usize) -> Option<Note> {
        if index < self.len() {
            Note::try_from_midi(LOWEST_MIDI_NOTE as i64 + index as i64)
        } else {
            None
        }
    }

    /// Find the table entry closest to `frequency`.
    /// On ties, the lower note wins.
    ///
    /// ```
    /// use perfect_instrument::quantizer::PIANO_KEYS;
    ///
    /// let nearest = PIANO_KEYS.nearest_note(440.0);
    /// assert_eq!(PIANO_KEYS.note(nearest.index).map(|n| n.to_midi()), Some(69));
    /// assert_eq!(nearest.distance, 0.0);
    /// ```
    pub fn nearest_note(&self, frequency: f64) -> NearestNote {
        let mut best = NearestNote {
            index: 0,
            distance: std::f64::INFINITY,
        };
        for (index, candidate) in self.frequencies.iter().enumerate() {
            let distance = (frequency - candidate).abs();
            if distance < best.distance {
                best = NearestNote { index, distance };
            }
        }
        best
    }
}

/// Result of quantizing a frequency.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NearestNote {
    /// Index into the frequency table.
    pub index: usize,
    /// Absolute distance in Hz.
    pub distance: f64,
}

/// Remembers the last note that fired a haptic pulse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HapticTriggerState {
    last_note: Option<usize>,
}

impl HapticTriggerState {
    /// Table index of the note that fired last, `None` while off the scale.
    pub fn last_quantized_note(&self) -> Option<usize> {
        self.last_note
    }
}

/// Decides when a (possibly bent) frequency lands on a new note of the scale.
#[derive(Debug, Clone, Copy)]
pub struct NoteQuantizer {
    table: &'static MidiFrequencyTable,
    threshold: f64,
}

impl Default for NoteQuantizer {
    fn default() -> Self {
        Self {
            table: &*PIANO_KEYS,
            threshold: HAPTIC_TRIGGER_DISTANCE,
        }
    }
}

impl NoteQuantizer {
    pub fn nearest_note(&self, frequency: f64) -> NearestNote {
        self.table.nearest_note(frequency)
    }

    /// Returns `true` when `frequency` is within the threshold of a note other than
    /// the one that triggered last. Drifting off the scale re-arms the trigger, so
    /// holding a note fires once and sliding fires once per note crossed.
    pub fn should_trigger(&self, frequency: f64, state: &mut HapticTriggerState) -> bool {
        let nearest = self.nearest_note(frequency);
        if nearest.distance > self.threshold {
            state.last_note = None;
            false
        } else if state.last_note != Some(nearest.index) {
            state.last_note = Some(nearest.index);
            true
        } else {
            false
        }
    }
}
