// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `perfect-instrument` plays a single note on one of the instruments,
//! either on the speakers or into a sound file.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use log::info;
use simple_logger;
use structopt::StructOpt;

use perfect_instrument::instrument::InstrumentMode;
use perfect_instrument::layout::{self, Fret};
use perfect_instrument::motion::Orientation;
use perfect_instrument::output::{AudioSink, Haptics, LogHaptics, SoxSink, SoxTarget};
use perfect_instrument::session::{Session, SessionConfig};
use perfect_instrument::{Error, Result};

#[derive(Debug, StructOpt)]
#[structopt(name = "perfect-instrument", about = "Playing piano, violin and guitar by tilting")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// One of piano, violin or guitar.
    #[structopt(short, long, default_value = "piano")]
    instrument: InstrumentMode,

    /// Note name such as A4, C#5 or Bb2.
    #[structopt(short, long, conflicts_with_all = &["frequency", "string", "position"])]
    note: Option<String>,

    /// Frequency in Hz.
    #[structopt(short, long, conflicts_with_all = &["string", "position"])]
    frequency: Option<f64>,

    /// Guitar string, 1 (high E) to 6 (low E).
    #[structopt(long, requires = "fret", conflicts_with = "position")]
    string: Option<u32>,

    /// Fret on the guitar string, 0 to 12.
    #[structopt(long, requires = "string")]
    fret: Option<u32>,

    /// Position on the violin strip, from 0 (left) to 1 (right).
    #[structopt(long)]
    position: Option<f64>,

    /// Amplitude between 0 and 1. Overridden by the roll when a device orientation is given.
    #[structopt(short, long, default_value = "0.5")]
    amplitude: f64,

    /// Pitch bend in semitones, between -2 and 2.
    #[structopt(short, long, allow_hyphen_values = true, conflicts_with_all = &["tilt", "roll"])]
    bend: Option<f64>,

    /// Simulated device pitch in radians, bending the note.
    #[structopt(long, allow_hyphen_values = true)]
    tilt: Option<f64>,

    /// Simulated device roll in radians, controlling the amplitude.
    #[structopt(long, allow_hyphen_values = true)]
    roll: Option<f64>,

    /// Hold a continuous note for this many seconds instead of striking it once.
    #[structopt(long)]
    hold: Option<f64>,

    /// Output file (any sox-supported format). The note is played directly if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

impl Opt {
    fn frequency(&self) -> Result<f64> {
        if let Some(name) = &self.note {
            layout::piano_key(name).ok_or(Error::InvalidParameter {
                name: "note",
                value: std::f64::NAN,
            })
        } else if let Some(frequency) = self.frequency {
            Ok(frequency)
        } else if let (Some(string), Some(fret)) = (self.string, self.fret) {
            Fret::new(string, fret).frequency()
        } else if let Some(position) = self.position {
            Ok(layout::violin_position(position))
        } else {
            Ok(440.0)
        }
    }

    fn orientation(&self) -> Option<Orientation> {
        if self.tilt.is_none() && self.roll.is_none() {
            None
        } else {
            Some(Orientation::new(
                self.tilt.unwrap_or(0.0),
                self.roll.unwrap_or(0.0),
            ))
        }
    }
}

/// Hold times must be finite and not negative.
fn hold_duration(seconds: f64) -> Result<Duration> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(Duration::from_secs_f64(seconds))
    } else {
        Err(Error::InvalidParameter {
            name: "hold",
            value: seconds,
        })
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("logging unavailable: {}", err);
    }

    let frequency = opt.frequency()?;
    let hold = opt.hold.map(hold_duration).transpose()?;
    let orientation = opt.orientation();

    let target = match &opt.output {
        Some(path) => SoxTarget::File(path.clone()),
        None => SoxTarget::Play,
    };
    let sink = SoxSink::new(target).map(|sink| Box::new(sink) as Box<dyn AudioSink>);
    let haptics: Result<Box<dyn Haptics>> = Ok(Box::new(LogHaptics));

    let config = SessionConfig {
        motion_enabled: orientation.is_some(),
        initial_mode: opt.instrument,
        initial_amplitude: opt.amplitude,
        ..SessionConfig::default()
    };
    let mut session = Session::with_outputs(config, sink, haptics)?;

    if let Some(orientation) = orientation {
        if let Some(params) = session.push_orientation(orientation) {
            info!("device orientation maps to {:?}", params);
            session.update_pitch_bend(params.pitch_bend)?;
            session.update_amplitude(params.modulation)?;
        }
    } else if let Some(bend) = opt.bend {
        session.update_pitch_bend(bend)?;
    }

    match hold {
        Some(duration) => {
            session.start_continuous_note(frequency)?;
            thread::sleep(duration);
            session.stop_continuous_note();
        }
        None => {
            session.play_note(frequency)?;
            thread::sleep(Duration::from_secs_f64(opt.instrument.one_shot_duration()));
        }
    }

    session.shutdown();
    Ok(())
}
