// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.

/// A "note" is just an index on a keyboard.
/// This definition follows the MIDI standard where C4 corresponds to index 60.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Note(u8);

/// The name of a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

/// Any offset applied to a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteOffset {
    /// The note is a half-tone lower then indicated by its name.
    Flat,
    /// The note is left unchanged.
    Base,
    /// The note is a half-tone higher then indicated by its name.
    Sharp,
}

impl Note {
    /// Convert a note from standard notation to a MIDI note index.
    /// Returns `None` if the note is not representable in the MIDI note system.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfect_instrument::note::*;
    ///
    /// assert_eq!(Note::try_named(NoteName::A, NoteOffset::Base, 4), Some(Note::from_midi(69)));
    /// assert_eq!(Note::try_named(NoteName::C, NoteOffset::Sharp, 6), Some(Note::from_midi(85)));
    /// assert_eq!(Note::try_named(NoteName::C, NoteOffset::Flat, -1), None);
    /// ```
    pub fn try_named(name: NoteName, offset: NoteOffset, octave: i32) -> Option<Note> {
        let name_index = match name {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        };
        let offset_index = match offset {
            NoteOffset::Base => 0,
            NoteOffset::Flat => -1,
            NoteOffset::Sharp => 1,
        };
        // C4 is MIDI note number 60
        let note_index = (octave + 1) * 12 + name_index + offset_index;
        Note::try_from_midi(note_index as i64)
    }

    /// Parse a name string of the format `<letter><offset><octave>`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use perfect_instrument::note::*;
    ///
    /// assert_eq!(Note::named_str("A4"), Some(Note::from_midi(69)));
    /// assert_eq!(Note::named_str("a4"), Some(Note::from_midi(69)));
    /// assert_eq!(Note::named_str("C#6"), Some(Note::from_midi(85)));
    /// assert_eq!(Note::named_str("Gb2"), Some(Note::from_midi(42)));
    /// assert_eq!(Note::named_str("H2"), None);
    /// ```
    pub fn named_str(name_str: &str) -> Option<Note> {
        let mut name_chars = name_str.chars();
        let name = match name_chars.next()?.to_ascii_uppercase() {
            'A' => NoteName::A,
            'B' => NoteName::B,
            'C' => NoteName::C,
            'D' => NoteName::D,
            'E' => NoteName::E,
            'F' => NoteName::F,
            'G' => NoteName::G,
            _ => return None,
        };

        let rest = name_chars.as_str();
        let offset_str = rest.trim_end_matches(|ch: char| ch.is_ascii_digit() || ch == '-');
        let offset = match offset_str {
            "sharp" | "♯" | "#" => NoteOffset::Sharp,
            "flat" | "♭" | "b" => NoteOffset::Flat,
            "" => NoteOffset::Base,
            _ => return None,
        };

        let octave = rest[offset_str.len()..].parse().ok()?;
        Note::try_named(name, offset, octave)
    }

    /// # Panics
    ///
    /// If `midi_note` lies outside of 0 - 127.
    pub fn from_midi(midi_note: u8) -> Note {
        assert!(midi_note < 128, "MIDI only has notes 0 - 127");
        Note(midi_note)
    }

    pub fn try_from_midi(midi_note: i64) -> Option<Note> {
        if (0..128).contains(&midi_note) {
            Some(Note(midi_note as u8))
        } else {
            None
        }
    }

    pub fn to_midi(self) -> u8 {
        self.0
    }

    /// Return the note index in a signed type, convenient for further calculations.
    pub fn index(self) -> i32 {
        self.0 as i32
    }
}
