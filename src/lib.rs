// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

pub mod error;
pub mod instrument;
pub mod layout;
pub mod motion;
pub mod note;
pub mod output;
pub mod playback;
pub mod quantizer;
pub mod session;
pub mod synth;
pub mod tuning;
pub mod wave;

pub use error::{Error, Result};
