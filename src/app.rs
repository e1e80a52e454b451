//! One scan run: poll, save, log, report.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::cli::ScanConfig;
use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::frame_source::{FrameSource, StillFrameSource, V4lFrameSource};
use crate::runtime_log;

pub const NOT_DETECTED: &str = "No QR code detected within timeout.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
	Detected(String),
	NotDetected,
}

impl Outcome {
	/// The line recorded in the runtime log.
	pub fn log_message(&self) -> String {
		return match self {
			Outcome::Detected(data) => format!("QR code detected: {}", data),
			Outcome::NotDetected => NOT_DETECTED.to_string(),
		};
	}
}

/// The frame source `config` asks for: an image file or a camera.
pub fn frame_source(config: &ScanConfig) -> Result<Box<dyn FrameSource>> {
	if let Some(path) = &config.image {
		return Ok(Box::new(StillFrameSource::open(path)?));
	}
	return Ok(Box::new(
		V4lFrameSource::new(config.device)
			.with_framesize(config.framesize.clone())
			.with_snapshot(config.snapshot.clone())));
}

/// Write `payload` verbatim to `path`, replacing an existing file.
pub fn save_payload(path: &Path, payload: &str, out: &mut dyn Write)
-> Result<()> {
	if path.exists() {
		writeln!(out, "Warning: Overwriting existing file {}", path.display())
			.map_err(Error::Console)?;
	}
	fs::write(path, payload).map_err(|e| Error::io(path, e))?;
	writeln!(out, "Data saved to {}", path.display())
		.map_err(Error::Console)?;
	return Ok(());
}

/// Poll for a code and record the outcome.
///
/// A failing log write only produces a console warning. A failing
/// output file write is returned as an error, after the outcome has
/// been logged.
pub fn run(
	config: &ScanConfig,
	source: &mut dyn FrameSource,
	decoder: &dyn Decoder,
	out: &mut dyn Write,
) -> Result<Outcome> {
	let outcome = match config.poller.poll_for_payload(source, decoder) {
		Some(data) => Outcome::Detected(data),
		None => Outcome::NotDetected,
	};

	let mut saved = Ok(());
	match &outcome {
		Outcome::Detected(data) => {
			writeln!(out, "QR code data: {}\nQR code detected.", data)
				.map_err(Error::Console)?;
			match &config.output {
				Some(path) => saved = save_payload(path, data, out),
				None => writeln!(out,
					"No output file specified. QR code data not saved.")
					.map_err(Error::Console)?,
			}
		}
		Outcome::NotDetected => {
			writeln!(out, "QR code data: None\n{}", NOT_DETECTED)
				.map_err(Error::Console)?;
		}
	}

	if let Err(e) = runtime_log::append_log(
		&config.log_file, &outcome.log_message()) {
		log::warn!("{}", e);
		writeln!(out, "Error writing to log file: {}", e)
			.map_err(Error::Console)?;
	}

	saved?;
	return Ok(outcome);
}
