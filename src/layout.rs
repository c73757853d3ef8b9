// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Where the player touches the instrument, and which frequency that means.

use crate::error::{InvalidParameter, Result};
use crate::note::Note;
use crate::tuning::{bend_ratio, Tuning};

/// Frequency of a piano key given by its name, like `"C#5"`.
///
/// ```
/// use perfect_instrument::layout::piano_key;
/// assert_eq!(piano_key("A4"), Some(440.0));
/// assert_eq!(piano_key("A5"), Some(880.0));
/// assert_eq!(piano_key("H2"), None);
/// ```
pub fn piano_key(name: &str) -> Option<f64> {
    Note::named_str(name).map(|note| Tuning::default().frequency(note))
}

/// Highest fret that can be pressed.
pub const FRET_COUNT: u32 = 12;

/// Open string frequencies in standard tuning, from the thinnest string (1) to the thickest (6).
pub const GUITAR_STRINGS: [f64; 6] = [329.63, 246.94, 196.00, 146.83, 110.00, 82.41];

/// A fretted position on the guitar neck.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fret {
    /// String number, 1 is the high E.
    pub string: u32,
    /// 0 is the open string.
    pub fret: u32,
}

impl Fret {
    pub fn new(string: u32, fret: u32) -> Self {
        Self { string, fret }
    }

    /// Frequency of the string shortened by the fret.
    ///
    /// ```
    /// use perfect_instrument::layout::Fret;
    /// assert_eq!(Fret::new(5, 0).frequency().unwrap(), 110.0);
    /// assert!((Fret::new(5, 12).frequency().unwrap() - 220.0).abs() < 1e-9);
    /// assert!(Fret::new(1, 13).frequency().is_err());
    /// ```
    pub fn frequency(&self) -> Result<f64> {
        let base = match self.string {
            1..=6 => GUITAR_STRINGS[self.string as usize - 1],
            _ => {
                return InvalidParameter {
                    name: "string",
                    value: self.string as f64,
                }
                .fail()
            }
        };
        if self.fret > FRET_COUNT {
            return InvalidParameter {
                name: "fret",
                value: self.fret as f64,
            }
            .fail();
        }
        Ok(base * bend_ratio(self.fret as f64))
    }
}

/// Lowest frequency on the violin strip.
pub const VIOLIN_LOWEST: f64 = 200.0;
/// Highest frequency on the violin strip.
pub const VIOLIN_HIGHEST: f64 = 2000.0;

/// Frequency at a horizontal position on the violin strip, `0` being the left edge.
/// Positions outside the strip stick to its edges.
///
/// ```
/// use perfect_instrument::layout::violin_position;
/// assert_eq!(violin_position(0.0), 200.0);
/// assert_eq!(violin_position(0.5), 1100.0);
/// assert_eq!(violin_position(7.0), 2000.0);
/// ```
pub fn violin_position(position: f64) -> f64 {
    let position = if position.is_nan() {
        0.0
    } else {
        position.max(0.0).min(1.0)
    };
    VIOLIN_LOWEST + (VIOLIN_HIGHEST - VIOLIN_LOWEST) * position
}
