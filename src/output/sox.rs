// perfect-instrument -- a motion controlled software instrument
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, error, warn};
use snafu::ResultExt;

use super::AudioSink;
use crate::error::{ResourceUnavailable, Result};
use crate::wave::{AudioBuffer, SAMPLE_RATE};

#[derive(Debug, Clone)]
pub enum SoxTarget {
    /// Play on the default speakers.
    Play,
    /// Write to any file format supported by sox.
    File(PathBuf),
}

/// Plays buffers by piping them into `play` (or `sox` when recording to a file).
///
/// Every scheduled buffer gets its own subprocess, fed by a writer thread that
/// repeats the buffer for looped playback.
pub struct SoxSink {
    target: SoxTarget,
    playback: Option<Playback>,
}

/// The subprocess and writer thread of the currently scheduled buffer.
struct Playback {
    child: Child,
    /// Dropping the sender tells the writer to stop after the current pass.
    stop: Sender<()>,
    writer: JoinHandle<()>,
}

impl SoxSink {
    /// Check that sox can be started for `target`.
    pub fn new(target: SoxTarget) -> Result<Self> {
        let (_, sox) = sox_binaries();
        Command::new(&sox)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .context(ResourceUnavailable {
                resource: "sox",
            })?;
        Ok(Self {
            target,
            playback: None,
        })
    }

    fn spawn(&self) -> Result<Child> {
        let sample_rate_str = format!("{}", SAMPLE_RATE);
        let input_args = &[
            "-R", // make the output reproducible
            "--channels",
            "2",
            "--rate",
            &sample_rate_str,
            "--type",
            "f64",
            "/dev/stdin",
        ];
        let (play, sox) = sox_binaries();

        let child = match &self.target {
            SoxTarget::Play => Command::new(&play)
                .args(input_args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn(),
            SoxTarget::File(outfile) => Command::new(&sox)
                .args(input_args)
                .arg(outfile)
                .stdin(Stdio::piped())
                .spawn(),
        };
        child.context(ResourceUnavailable {
            resource: "sox",
        })
    }

    /// Time between two passes of a looped buffer. The speakers pace themselves
    /// through the pipe, files have to be paced explicitly.
    fn loop_pause(&self, buffer: &AudioBuffer) -> Duration {
        match self.target {
            SoxTarget::Play => Duration::from_secs(0),
            SoxTarget::File(_) => Duration::from_secs_f64(buffer.duration()),
        }
    }
}

impl AudioSink for SoxSink {
    fn schedule(&mut self, buffer: AudioBuffer, looped: bool) -> Result<()> {
        self.stop();

        let mut child = self.spawn()?;
        let audio_stream = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let missing: io::Result<ChildStdin> = Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "stdin of sox was not piped",
                ));
                missing.context(ResourceUnavailable { resource: "sox" })?
            }
        };

        let pause = self.loop_pause(&buffer);
        let (stop, stopped) = bounded::<()>(0);
        let writer = thread::Builder::new()
            .name("sox-writer".into())
            .spawn(move || {
                let bytes = buffer.to_bytes();
                write_passes(audio_stream, &bytes, looped, || {
                    matches!(stopped.recv_timeout(pause), Err(RecvTimeoutError::Timeout))
                })
            })
            .context(ResourceUnavailable {
                resource: "sox writer thread",
            })?;

        self.playback = Some(Playback {
            child,
            stop,
            writer,
        });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            drop(playback.stop);
            if let SoxTarget::Play = self.target {
                // unblocks the writer if it is stuck on a full pipe
                if let Err(err) = playback.child.kill() {
                    debug!("sox already exited: {}", err);
                }
            }
            if playback.writer.join().is_err() {
                error!("sox writer thread panicked");
            }
            if let Err(err) = playback.child.wait() {
                warn!("failed to wait for sox: {}", err);
            }
        }
    }
}

impl Drop for SoxSink {
    fn drop(&mut self) {
        self.stop()
    }
}

/// Write `bytes` once, or repeatedly while `again` agrees when `looped`.
/// Closing the stream afterwards lets sox exit on its own.
fn write_passes<F: FnMut() -> bool>(
    mut stream: ChildStdin,
    bytes: &[u8],
    looped: bool,
    mut again: F,
) {
    loop {
        let status = stream.write_all(bytes).and_then(|_| stream.flush());
        if let Err(err) = status {
            // expected when playback was halted by killing sox
            debug!("audio stream to sox closed: {}", err);
            break;
        }
        if !looped || !again() {
            break;
        }
    }
}

/// Locations of the `play` and `sox` executables.
fn sox_binaries() -> (PathBuf, PathBuf) {
    // For properly recording the sox dependency on nix:
    if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
        debug!("using sox from nix store {}", sox_bin);
        (Path::new(sox_bin).join("play"), Path::new(sox_bin).join("sox"))
    } else {
        ("play".into(), "sox".into())
    }
}
