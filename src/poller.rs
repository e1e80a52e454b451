use std::thread;
use std::time::{Duration, Instant};

use crate::decoder::Decoder;
use crate::frame_source::FrameSource;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Convert a number of seconds into a `Duration`, `None` unless it is
/// finite and strictly positive.
pub fn positive_secs(secs: f64) -> Option<Duration> {
	if secs.is_nan() || secs <= 0.0 {
		return None;
	}
	return match Duration::try_from_secs_f64(secs) {
		Ok(d) if !d.is_zero() => Some(d),
		_ => None,
	};
}

/// Samples a frame source until a code is decoded or time runs out.
///
/// ```
/// use std::time::Duration;
/// use image::{DynamicImage, GrayImage};
/// use qrcode_capture::{Poller, StillFrameSource, decoder};
///
/// let mut source = StillFrameSource::new(
///     DynamicImage::ImageLuma8(GrayImage::new(64, 64)));
/// let poller = Poller::new(
///     Duration::from_millis(20), Duration::from_millis(100));
/// let bar = decoder::BarDecoder::new();
/// assert_eq!(poller.poll_for_payload(&mut source, &bar), None);
/// assert!(source.calls() >= 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poller {
	interval: Duration,
	timeout: Duration,
}

impl Default for Poller {
	fn default() -> Self {
		return Poller::new(DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT);
	}
}

impl Poller {
	pub fn new(interval: Duration, timeout: Duration) -> Poller {
		return Poller { interval: interval, timeout: timeout };
	}

	/// Same as [`Poller::new`] with both values in seconds. Values that
	/// are not finite and positive fall back to the defaults.
	pub fn from_secs(interval: f64, timeout: f64) -> Poller {
		return Poller::new(
			positive_secs(interval).unwrap_or(DEFAULT_POLL_INTERVAL),
			positive_secs(timeout).unwrap_or(DEFAULT_TIMEOUT));
	}

	pub fn interval(&self) -> Duration {
		return self.interval;
	}

	pub fn timeout(&self) -> Duration {
		return self.timeout;
	}

	/// Returns the first payload of the first frame that contains one,
	/// `None` once the timeout has passed.
	///
	/// Every unsuccessful attempt, whether capture or decode failed,
	/// is followed by one poll interval of sleep, cut short at the
	/// deadline.
	pub fn poll_for_payload(
		&self,
		source: &mut dyn FrameSource,
		decoder: &dyn Decoder,
	) -> Option<String> {
		let start = Instant::now();
		let mut attempts = 0u32;
		while start.elapsed() < self.timeout {
			attempts += 1;
			match source.acquire() {
				Ok(frame) => {
					let first = decoder.decode(&frame)
						.and_then(|p| p.into_iter().next());
					if first.is_some() {
						log::debug!(
							"QR code found after {} attempts", attempts);
						return first;
					}
					log::trace!("No QR code in frame {}", attempts);
				}
				Err(e) => log::warn!("No image captured: {}", e),
			}
			let remaining = self.timeout.saturating_sub(start.elapsed());
			thread::sleep(self.interval.min(remaining));
		}
		log::debug!(
			"No QR code detected within {:?} ({} attempts)",
			self.timeout, attempts);
		return None;
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::time::{Duration, Instant};

	use image::{DynamicImage, GrayImage};

	use super::Poller;
	use crate::decoder::{self, Decoder, DecoderKind};
	use crate::frame_source::{Frame, StillFrameSource};
	use crate::test_frames::qr_png;

	struct Fixed(Option<Vec<String>>, Cell<usize>);

	impl Fixed {
		fn new(payloads: Option<Vec<&str>>) -> Fixed {
			return Fixed(
				payloads.map(|p| p.iter().map(|s| s.to_string()).collect()),
				Cell::new(0));
		}
	}

	impl Decoder for Fixed {
		fn decode(&self, _frame: &Frame) -> Option<Vec<String>> {
			self.1.set(self.1.get() + 1);
			return self.0.clone();
		}
	}

	fn blank_source() -> StillFrameSource {
		return StillFrameSource::new(
			DynamicImage::ImageLuma8(GrayImage::new(8, 8)));
	}

	#[test]
	fn positive_secs() {
		assert_eq!(super::positive_secs(0.0), None);
		assert_eq!(super::positive_secs(-1.0), None);
		assert_eq!(super::positive_secs(f64::NAN), None);
		assert_eq!(super::positive_secs(f64::INFINITY), None);
		assert_eq!(super::positive_secs(1e-12), None);
		assert_eq!(
			super::positive_secs(0.2),
			Some(Duration::from_millis(200)));
	}

	#[test]
	fn from_secs_falls_back() {
		assert_eq!(Poller::from_secs(0.0, -3.0), Poller::default());
		let p = Poller::from_secs(0.5, 2.0);
		assert_eq!(p.interval(), Duration::from_millis(500));
		assert_eq!(p.timeout(), Duration::from_secs(2));
	}

	#[test]
	fn returns_first_payload_immediately() {
		let mut source = blank_source();
		let decoder = Fixed::new(Some(vec!["hello-world", "second"]));
		let poller = Poller::from_secs(0.2, 5.0);
		let start = Instant::now();
		let result = poller.poll_for_payload(&mut source, &decoder);
		assert_eq!(result, Some("hello-world".to_string()));
		assert_eq!(source.calls(), 1);
		assert_eq!(decoder.1.get(), 1);
		assert!(start.elapsed() < Duration::from_millis(200));
	}

	#[test]
	fn gives_up_after_timeout() {
		let mut source = blank_source();
		let decoder = Fixed::new(None);
		let poller = Poller::from_secs(0.2, 1.0);
		let start = Instant::now();
		let result = poller.poll_for_payload(&mut source, &decoder);
		let elapsed = start.elapsed();
		assert_eq!(result, None);
		assert!((4..=6).contains(&source.calls()), "{}", source.calls());
		assert!(elapsed >= Duration::from_secs(1));
		assert!(elapsed < Duration::from_millis(1300));
	}

	#[test]
	fn failed_capture_still_sleeps() {
		let mut source = StillFrameSource::unavailable();
		let decoder = Fixed::new(Some(vec!["never"]));
		let poller = Poller::from_secs(0.1, 0.5);
		assert_eq!(poller.poll_for_payload(&mut source, &decoder), None);
		assert!((4..=6).contains(&source.calls()), "{}", source.calls());
		assert_eq!(decoder.1.get(), 0);
	}

	#[test]
	fn empty_payload_list_is_a_miss() {
		let mut source = blank_source();
		let decoder = Fixed::new(Some(vec![]));
		let poller = Poller::from_secs(0.1, 0.5);
		let start = Instant::now();
		assert_eq!(poller.poll_for_payload(&mut source, &decoder), None);
		assert!(start.elapsed() >= Duration::from_millis(500));
		assert!(source.calls() > 1, "{}", source.calls());
	}

	#[test]
	fn interval_longer_than_timeout() {
		let mut source = blank_source();
		let decoder = Fixed::new(None);
		let poller = Poller::new(
			Duration::from_secs(5), Duration::from_millis(100));
		let start = Instant::now();
		assert_eq!(poller.poll_for_payload(&mut source, &decoder), None);
		assert!(start.elapsed() < Duration::from_secs(1));
		assert_eq!(source.calls(), 1);
	}

	#[test]
	fn finds_code_in_image_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = qr_png(dir.path(), "ABC123");
		for kind in [DecoderKind::Bardecoder, DecoderKind::Rxing] {
			let mut source = StillFrameSource::open(&path).unwrap();
			let decoder = decoder::for_kind(kind);
			let poller = Poller::from_secs(0.1, 5.0);
			assert_eq!(
				poller.poll_for_payload(&mut source, decoder.as_ref()),
				Some("ABC123".to_string()),
				"{:?}", kind);
			assert_eq!(source.calls(), 1);
		}
	}
}
