// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Where rendered buffers and haptic pulses end up.

pub mod sox;

use log::trace;

use crate::error::Result;
use crate::wave::AudioBuffer;

pub use sox::{SoxSink, SoxTarget};

/// A device that plays buffers.
///
/// At most one buffer is scheduled at a time: scheduling replaces whatever
/// was playing before.
pub trait AudioSink: Send {
    /// Take ownership of `buffer` and start playing it, repeating it until
    /// [`AudioSink::stop`] is called if `looped` is set.
    fn schedule(&mut self, buffer: AudioBuffer, looped: bool) -> Result<()>;

    /// Halt playback and discard the current buffer.
    fn stop(&mut self);
}

/// A device that produces short vibrations.
pub trait Haptics: Send {
    /// Fire a single short pulse. Both parameters lie in `[0, 1]`.
    fn fire_transient_pulse(&mut self, intensity: f64, sharpness: f64) -> Result<()>;
}

/// Swallows all buffers. Stands in when no audio device could be opened.
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn schedule(&mut self, buffer: AudioBuffer, looped: bool) -> Result<()> {
        trace!("discarding {} frames (looped: {})", buffer.len(), looped);
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Haptic backend that only reports the pulses in the log.
#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn fire_transient_pulse(&mut self, intensity: f64, sharpness: f64) -> Result<()> {
        log::info!(
            "haptic pulse (intensity {:.2}, sharpness {:.2})",
            intensity,
            sharpness
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Collaborators that record what the core asks of them.

    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::BackendMissing;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SinkCall {
        Schedule { frames: usize, looped: bool },
        Stop,
    }

    /// Sink recording every call; clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        pub calls: Arc<Mutex<Vec<SinkCall>>>,
        pub buffers: Arc<Mutex<Vec<AudioBuffer>>>,
        pub fail: Arc<Mutex<bool>>,
    }

    impl RecordingSink {
        pub fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().clone()
        }

        pub fn last_buffer(&self) -> Option<AudioBuffer> {
            self.buffers.lock().last().cloned()
        }
    }

    impl AudioSink for RecordingSink {
        fn schedule(&mut self, buffer: AudioBuffer, looped: bool) -> Result<()> {
            if *self.fail.lock() {
                return BackendMissing {
                    resource: "audio output",
                    reason: "unplugged",
                }
                .fail();
            }
            self.calls.lock().push(SinkCall::Schedule {
                frames: buffer.len(),
                looped,
            });
            self.buffers.lock().push(buffer);
            Ok(())
        }

        fn stop(&mut self) {
            self.calls.lock().push(SinkCall::Stop);
        }
    }

    /// Counts pulses; clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingHaptics {
        pub pulses: Arc<Mutex<Vec<(f64, f64)>>>,
    }

    impl RecordingHaptics {
        pub fn count(&self) -> usize {
            self.pulses.lock().len()
        }
    }

    impl Haptics for RecordingHaptics {
        fn fire_transient_pulse(&mut self, intensity: f64, sharpness: f64) -> Result<()> {
            self.pulses.lock().push((intensity, sharpness));
            Ok(())
        }
    }
}
