// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Errors that can occur while making sounds.

use std::io;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid value {} for parameter {}", value, name))]
    InvalidParameter { name: &'static str, value: f64 },

    #[snafu(display("{} is not available: {}", resource, source))]
    ResourceUnavailable {
        resource: &'static str,
        source: io::Error,
    },

    #[snafu(display("{} is not available: {}", resource, reason))]
    BackendMissing {
        resource: &'static str,
        reason: String,
    },

    #[snafu(display("Could not allocate an audio buffer of {} frames", frames))]
    GenerationFailure { frames: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Whether the error was caused by a collaborator (audio output, haptics)
    /// rather than by the request itself.
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Error::ResourceUnavailable { .. } | Error::BackendMissing { .. }
        )
    }
}

/// Reject frequencies and durations that are not strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        InvalidParameter { name, value }.fail()
    }
}
