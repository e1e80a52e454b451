//! Append-only CSV log of scan outcomes.
//!
//! The file starts with a `Timestamp,Message` header row, written once
//! when the file is empty. Every call adds exactly one record after it.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use chrono::{Local, NaiveDateTime};

use crate::error::{Error, Result};

pub const DEFAULT_LOG_FILE: &str = "runtime_log.csv";
pub const HEADER: [&str; 2] = ["Timestamp", "Message"];
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
	pub timestamp: NaiveDateTime,
	pub message: String,
}

impl LogRecord {
	/// A record stamped with the current local wall-clock time.
	pub fn now(message: &str) -> LogRecord {
		return LogRecord {
			timestamp: Local::now().naive_local(),
			message: message.to_string(),
		};
	}

	fn fields(&self) -> [String; 2] {
		return [
			self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
			self.message.clone(),
		];
	}
}

/// Append `message` to the log at `path`.
///
/// An empty `path` disables logging: nothing is written and `Ok` is
/// returned. Missing parent directories are created.
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let dir = tempfile::tempdir()?;
/// let path = dir.path().join("logs/runtime_log.csv");
/// qrcode_capture::append_log(&path, "QR code detected: hello")?;
/// let text = std::fs::read_to_string(&path)?;
/// assert!(text.starts_with("Timestamp,Message\n"));
/// assert!(text.ends_with(",QR code detected: hello\n"));
/// # Ok(())
/// # }
/// ```
pub fn append_log(path: &Path, message: &str) -> Result<()> {
	if path.as_os_str().is_empty() {
		log::warn!("No filename provided for logging.");
		return Ok(());
	}
	return append_record(path, &LogRecord::now(message));
}

pub fn append_record(path: &Path, record: &LogRecord) -> Result<()> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
		}
	}
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|e| Error::io(path, e))?;
	let empty = file.metadata().map_err(|e| Error::io(path, e))?.len() == 0;
	let mut writer = csv::WriterBuilder::new()
		.has_headers(false)
		.from_writer(file);
	let csv_error = |e: csv::Error| Error::io(path, io::Error::from(e));
	if empty {
		writer.write_record(HEADER).map_err(csv_error)?;
	}
	writer.write_record(record.fields()).map_err(csv_error)?;
	writer.flush().map_err(|e| Error::io(path, e))?;
	log::trace!("Logged to {}: {}", path.display(), record.message);
	return Ok(());
}
