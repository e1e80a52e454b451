use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::decoder::DecoderKind;
use crate::frame_source::TargetFrameSize;
use crate::poller::{self, Poller};
use crate::runtime_log::DEFAULT_LOG_FILE;

pub const DEFAULT_TIMEOUT_SECS: i64 = 10;

/// Scan a QR code using the device's camera.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
	/// Optional filename to save QR code data.
	#[arg(long)]
	pub output: Option<PathBuf>,

	/// Timeout in seconds for QR code detection.
	#[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS,
		allow_negative_numbers = true)]
	pub timeout: i64,

	/// Seconds to wait between two capture attempts.
	#[arg(long, default_value_t = 0.2, allow_negative_numbers = true)]
	pub interval: f64,

	/// video4linux device index, 0 is /dev/video0.
	#[arg(long, default_value_t = 0)]
	pub device: usize,

	/// Scan this image file instead of a camera.
	#[arg(long, conflicts_with_all = ["device", "snapshot"])]
	pub image: Option<PathBuf>,

	/// Save every frame captured from the camera to this path.
	#[arg(long)]
	pub snapshot: Option<PathBuf>,

	/// CSV file the outcome is appended to. Empty disables logging.
	#[arg(long, default_value = DEFAULT_LOG_FILE)]
	pub log_file: String,

	#[arg(long, value_enum, default_value_t = DecoderKind::Bardecoder)]
	pub decoder: DecoderKind,

	/// Preferred capture width.
	#[arg(long, default_value_t = 640)]
	pub width: u32,

	/// Preferred capture height.
	#[arg(long, default_value_t = 480)]
	pub height: u32,
}

/// Validated settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanConfig {
	pub output: Option<PathBuf>,
	pub poller: Poller,
	pub device: usize,
	pub image: Option<PathBuf>,
	pub snapshot: Option<PathBuf>,
	pub log_file: PathBuf,
	pub decoder: DecoderKind,
	pub framesize: TargetFrameSize,
}

/// The timeout actually used for a requested one.
pub fn effective_timeout(secs: i64) -> Duration {
	if secs <= 0 {
		return Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64);
	}
	return Duration::from_secs(secs as u64);
}

impl Args {
	/// Validate the arguments, printing what will be used to `out`.
	pub fn resolve(self, out: &mut dyn Write) -> io::Result<ScanConfig> {
		match &self.output {
			Some(path) => writeln!(out, "Output file: {}", path.display())?,
			None => writeln!(
				out, "No output file provided, will only log result.")?,
		}

		if self.timeout <= 0 {
			writeln!(out,
				"Timeout must be a positive integer. \
				Using default of {} seconds.",
				DEFAULT_TIMEOUT_SECS)?;
		}
		let timeout = effective_timeout(self.timeout);
		writeln!(out, "Timeout set to: {} seconds", timeout.as_secs())?;

		let interval = match poller::positive_secs(self.interval) {
			Some(i) => i,
			None => {
				writeln!(out,
					"Poll interval must be positive. \
					Using default of {} seconds.",
					poller::DEFAULT_POLL_INTERVAL.as_secs_f64())?;
				poller::DEFAULT_POLL_INTERVAL
			}
		};

		return Ok(ScanConfig {
			output: self.output,
			poller: Poller::new(interval, timeout),
			device: self.device,
			image: self.image,
			snapshot: self.snapshot,
			log_file: PathBuf::from(self.log_file),
			decoder: self.decoder,
			framesize: TargetFrameSize {
				width: self.width,
				height: self.height,
			},
		});
	}
}
