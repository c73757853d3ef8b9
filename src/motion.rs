// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Turning the attitude of the device into expression parameters.

use std::f64::consts::PI;

use log::{debug, trace};

use crate::synth::MAX_PITCH_BEND;

/// Rate at which the motion sensor delivers samples.
pub const SENSOR_RATE_HZ: f64 = 100.0;

/// Attitude of the device in radians (right-handed, device frame).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Orientation {
    /// Rotation around the lateral axis.
    pub pitch: f64,
    /// Rotation around the longitudinal axis.
    pub roll: f64,
}

impl Orientation {
    pub fn new(pitch: f64, roll: f64) -> Self {
        Self { pitch, roll }
    }
}

/// Expression parameters derived from one orientation sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionParameters {
    /// Pitch bend in semitones, within `[-2, 2]`.
    pub pitch_bend: f64,
    /// Modulation within `[0, 1]`, driving the amplitude.
    pub modulation: f64,
}

impl Default for MotionParameters {
    /// The device lying flat: no bend, half modulation.
    fn default() -> Self {
        Self {
            pitch_bend: 0.0,
            modulation: 0.5,
        }
    }
}

impl MotionParameters {
    /// Map a single orientation sample.
    ///
    /// A quarter turn of pitch bends by the full two semitones, a sixth of a turn
    /// of roll in either direction sweeps the modulation through its range.
    /// There is no smoothing: the same sample always yields the same parameters.
    ///
    /// ```
    /// use std::f64::consts::PI;
    /// use perfect_instrument::motion::*;
    ///
    /// let flat = MotionParameters::from_orientation(Orientation::new(0.0, 0.0));
    /// assert_eq!(flat, MotionParameters { pitch_bend: 0.0, modulation: 0.5 });
    ///
    /// let tilted = MotionParameters::from_orientation(Orientation::new(PI, -PI));
    /// assert_eq!(tilted, MotionParameters { pitch_bend: 2.0, modulation: 0.0 });
    /// ```
    pub fn from_orientation(orientation: Orientation) -> Self {
        let normalized_pitch = clamp(orientation.pitch / (PI / 2.0), -1.0, 1.0);
        let normalized_roll = orientation.roll / (PI / 3.0);
        Self {
            pitch_bend: normalized_pitch * MAX_PITCH_BEND,
            modulation: clamp((normalized_roll + 1.0) / 2.0, 0.0, 1.0),
        }
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        (min + max) / 2.0
    } else {
        value.max(min).min(max)
    }
}

/// Receives orientation samples from the sensor and keeps the latest mapped parameters.
#[derive(Debug, Clone)]
pub struct MotionMapper {
    latest: MotionParameters,
    active: bool,
}

impl Default for MotionMapper {
    fn default() -> Self {
        Self {
            latest: MotionParameters::default(),
            active: true,
        }
    }
}

impl MotionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a sensor sample. Ignored while stopped.
    pub fn push(&mut self, orientation: Orientation) -> Option<MotionParameters> {
        if !self.active {
            return None;
        }
        self.latest = MotionParameters::from_orientation(orientation);
        trace!(
            "{:?} -> bend {:.3}, modulation {:.3}",
            orientation,
            self.latest.pitch_bend,
            self.latest.modulation
        );
        Some(self.latest)
    }

    /// The parameters of the most recent sample.
    pub fn latest(&self) -> MotionParameters {
        self.latest
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Resume accepting samples.
    pub fn start(&mut self) {
        if !self.active {
            debug!("motion updates started");
            self.active = true;
        }
    }

    /// Stop accepting samples, keeping the last parameters.
    pub fn stop(&mut self) {
        if self.active {
            debug!("motion updates stopped");
            self.active = false;
        }
    }

    /// Back to the resting parameters.
    pub fn reset(&mut self) {
        self.latest = MotionParameters::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitch_maps_to_bend() {
        let half_tilt = MotionParameters::from_orientation(Orientation::new(PI / 4.0, 0.0));
        assert!((half_tilt.pitch_bend - 1.0).abs() < 1e-12);
        let backwards = MotionParameters::from_orientation(Orientation::new(-PI, 0.0));
        assert_eq!(backwards.pitch_bend, -2.0);
    }

    #[test]
    fn roll_maps_to_modulation() {
        let full = MotionParameters::from_orientation(Orientation::new(0.0, PI / 3.0));
        assert!((full.modulation - 1.0).abs() < 1e-12);
        let quarter = MotionParameters::from_orientation(Orientation::new(0.0, -PI / 6.0));
        assert!((quarter.modulation - 0.25).abs() < 1e-12);
        let beyond = MotionParameters::from_orientation(Orientation::new(0.0, 3.0));
        assert_eq!(beyond.modulation, 1.0);
    }

    #[test]
    fn mapping_is_idempotent() {
        let sample = Orientation::new(0.3, -0.2);
        let mut mapper = MotionMapper::new();
        let first = mapper.push(sample);
        let second = mapper.push(sample);
        assert_eq!(first, second);
        assert_eq!(first, Some(MotionParameters::from_orientation(sample)));
    }

    #[test]
    fn stopped_mapper_ignores_samples() {
        let mut mapper = MotionMapper::new();
        mapper.push(Orientation::new(1.0, 1.0));
        let held = mapper.latest();
        mapper.stop();
        assert_eq!(mapper.push(Orientation::new(-1.0, -1.0)), None);
        assert_eq!(mapper.latest(), held);

        mapper.reset();
        assert_eq!(mapper.latest(), MotionParameters::default());
        mapper.start();
        assert!(mapper.push(Orientation::new(0.0, 0.0)).is_some());
    }
}
