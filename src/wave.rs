// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

use std::ops;

use crate::error::{GenerationFailure, Result};

/// Every buffer produced by the instruments is sampled at this rate.
pub const SAMPLE_RATE: u32 = 44100;

/// Number of frames needed for `duration` seconds of audio at [`SAMPLE_RATE`].
///
/// ```
/// use perfect_instrument::wave::frames_for;
///
/// assert_eq!(frames_for(3.0), 132300);
/// assert_eq!(frames_for(0.00001), 0);
/// ```
pub fn frames_for(duration: f64) -> usize {
    (SAMPLE_RATE as f64 * duration).round() as usize
}

/// A fixed-length buffer of stereo frames at [`SAMPLE_RATE`].
///
/// The creator owns the buffer until it is handed to an output sink,
/// which then owns it for as long as it plays (possibly in a loop).
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    frames: Vec<Stereo<f64>>,
}

#[allow(clippy::len_without_is_empty)]
impl AudioBuffer {
    /// Allocate a silent buffer holding `frame_count` frames.
    ///
    /// Fails instead of aborting when the memory cannot be reserved.
    pub fn silent(frame_count: usize) -> Result<Self> {
        let mut frames = Vec::new();
        if frames.try_reserve_exact(frame_count).is_err() {
            return GenerationFailure {
                frames: frame_count,
            }
            .fail();
        }
        frames.resize(frame_count, Stereo::mono(0.0));
        Ok(Self { frames })
    }

    /// Size of the buffer in frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Length of the buffer in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / SAMPLE_RATE as f64
    }

    /// Size of the buffer in bytes when interleaved as `f64` samples.
    pub fn byte_len(&self) -> usize {
        self.len() * 2 * std::mem::size_of::<f64>()
    }

    pub fn frames(&self) -> &[Stereo<f64>] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [Stereo<f64>] {
        &mut self.frames
    }

    /// Copy the stereo `f64` samples to bytes, interleaving the left and right samples.
    ///
    /// Returns the number of frames that were actually copied.
    /// Might be less than the number of frames if the output buffer was not large enough.
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (frame, target) in self.frames.iter().zip(bytes.chunks_exact_mut(16)) {
            target[0..8].copy_from_slice(&frame.left.to_le_bytes());
            target[8..16].copy_from_slice(&frame.right.to_le_bytes());
            processed += 1;
        }
        processed
    }

    /// The interleaved little endian byte representation of the whole buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.byte_len()];
        self.copy_bytes_to(&mut bytes);
        bytes
    }
}

/// Convenience type for making things stereo, e.g. individual samples or whole buffers.
///
/// ```
/// use perfect_instrument::wave::*;
///
/// let stereo = Stereo::new(0.25, 0.5);
/// let stereo2 = stereo + Stereo::mono(0.25);
/// assert_eq!(stereo2 * 2.0, Stereo::new(1.0, 1.5));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stereo<T> {
    pub left: T,
    pub right: T,
}

impl<T> Stereo<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// The same signal on both channels.
    pub fn mono(mono: T) -> Self
    where
        T: Copy,
    {
        Self::new(mono, mono)
    }
}

impl<T: ops::Add> ops::Add for Stereo<T> {
    type Output = Stereo<T::Output>;

    fn add(self, rhs: Self) -> Self::Output {
        Stereo {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl<T: ops::Mul + Copy> ops::Mul<T> for Stereo<T> {
    type Output = Stereo<T::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Stereo {
            left: self.left * rhs,
            right: self.right * rhs,
        }
    }
}
