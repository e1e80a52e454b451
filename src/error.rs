use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	/// The camera device could not be opened.
	#[error("could not open camera device {device}")]
	DeviceUnavailable {
		device: usize,
		#[source]
		source: io::Error,
	},
	/// The device was opened but no usable frame came out of it.
	#[error("failed to capture image from {origin}")]
	CaptureFailed {
		origin: String,
		#[source]
		source: io::Error,
	},
	#[error("I/O failure on {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to write to console")]
	Console(#[source] io::Error),
}

impl Error {
	pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
		return Error::Io { path: path.into(), source: source };
	}
}

pub type Result<T> = std::result::Result<T, Error>;
