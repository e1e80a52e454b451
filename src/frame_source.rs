use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use v4l::FourCC;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;

use crate::error::{Error, Result};
use crate::image_decode;

/// One camera image, owned by the poll iteration that acquired it.
pub type Frame = DynamicImage;

/// Something that can hand out one frame at a time.
pub trait FrameSource {
	/// Acquire the most recent frame.
	///
	/// [`Error::DeviceUnavailable`] and [`Error::CaptureFailed`] mean
	/// "nothing this time"; callers are expected to retry.
	fn acquire(&mut self) -> Result<Frame>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetFrameSize {
	pub width: u32,
	pub height: u32,
}

impl Default for TargetFrameSize {
	fn default() -> Self {
		return TargetFrameSize { width: 640, height: 480 };
	}
}

// smaller frames decode faster, so take the size closest to the target
fn choose_framesize(
	formats: Vec<(FourCC, v4l::FrameSize)>, target: &TargetFrameSize)
-> io::Result<(FourCC, u32, u32)> {
	let mut best: Option<(u32, FourCC, u32, u32)> = None;
	for (fourcc, framesize) in formats {
		for discrete in framesize.size.to_discrete() {
			log::trace!("Available format: {} {}", fourcc, discrete);
			let diff_h = target.height.abs_diff(discrete.height);
			let diff_w = target.width.abs_diff(discrete.width);
			let diff =
				diff_h * diff_h + diff_w * diff_w +
				diff_h * diff_w;
			let better = match &best {
				Some((best_diff, ..)) => diff < *best_diff,
				None => true,
			};
			if better {
				best = Some((
					diff, fourcc,
					discrete.width, discrete.height));
			}
		}
	}
	return match best {
		Some((_, fourcc, width, height)) => Ok((fourcc, width, height)),
		None => Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			"No camera format supported")),
	};
}

fn choose_and_set_format(dev: &v4l::Device, target: &TargetFrameSize)
-> io::Result<v4l::Format> {
	let mut formats = vec![];
	for fourcc in [FourCC::new(b"YUYV"), FourCC::new(b"MJPG")] {
		for framesize in dev.enum_framesizes(fourcc)? {
			formats.push((fourcc, framesize));
		}
	}
	let (fourcc, width, height) = choose_framesize(formats, target)?;
	let mut format = dev.format()?;
	format.fourcc = fourcc;
	format.width = width;
	format.height = height;
	log::debug!("Chosen camera format: {:?}", format);
	let format = dev.set_format(&format)?;
	log::debug!("Camera format set: {:?}", format);
	if format.fourcc != fourcc {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Camera refused format {}", fourcc)));
	}
	return Ok(format);
}

fn save_snapshot(frame: &Frame, path: &Path) {
	match frame.save(path) {
		Ok(()) => log::info!("Image saved to {}", path.display()),
		Err(e) => log::warn!(
			"Failed to save image to {}: {}", path.display(), e),
	}
}

/// Reads single frames from a video4linux device.
///
/// The device is opened and released again on every call to
/// [`FrameSource::acquire`], nothing is held between polls.
///
/// ```
/// use qrcode_capture::{FrameSource, V4lFrameSource};
/// # fn no_v4l_device() {
/// let mut source = V4lFrameSource::new(0)
///     .with_snapshot(Some("snapshot.png".into()));
/// let frame = source.acquire().unwrap();
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct V4lFrameSource {
	device: usize,
	target: TargetFrameSize,
	snapshot: Option<PathBuf>,
}

impl V4lFrameSource {
	pub fn new(device: usize) -> V4lFrameSource {
		return V4lFrameSource {
			device: device,
			target: TargetFrameSize::default(),
			snapshot: None,
		};
	}

	/// Configure the device with a frame size as close as possible to
	/// `target`. Bigger frames take longer to decode.
	pub fn with_framesize(mut self, target: TargetFrameSize) -> Self {
		self.target = target;
		return self;
	}

	/// Write every acquired frame to `path`, replacing what is there.
	pub fn with_snapshot(mut self, path: Option<PathBuf>) -> Self {
		self.snapshot = path;
		return self;
	}

	fn capture_failed(&self, source: io::Error) -> Error {
		return Error::CaptureFailed {
			origin: format!("camera device {}", self.device),
			source: source,
		};
	}

	fn read_frame(&self, dev: &v4l::Device) -> io::Result<Frame> {
		let format = choose_and_set_format(dev, &self.target)?;
		let converter = image_decode::converter_for_fourcc(&format.fourcc)?;
		let mut stream = v4l::prelude::MmapStream::with_buffers(
			dev,
			v4l::buffer::Type::VideoCapture,
			4)?;
		stream.next()?; // warmup
		let (buf, meta) = stream.next()?;
		let used = (meta.bytesused as usize).min(buf.len());
		let used = if used == 0 { buf.len() } else { used };
		return converter(&buf[..used], format.width, format.height);
	}
}

impl FrameSource for V4lFrameSource {
	fn acquire(&mut self) -> Result<Frame> {
		let dev = v4l::Device::new(self.device).map_err(|e| {
			Error::DeviceUnavailable { device: self.device, source: e }
		})?;
		let frame = self.read_frame(&dev)
			.map_err(|e| self.capture_failed(e))?;
		drop(dev);
		if let Some(path) = &self.snapshot {
			save_snapshot(&frame, path);
		}
		return Ok(frame);
	}
}

/// Serves the same still image on every call.
///
/// Stands in for a camera when scanning an image file, and in tests.
///
/// ```
/// use image::{DynamicImage, GrayImage};
/// use qrcode_capture::{FrameSource, StillFrameSource};
///
/// let blank = DynamicImage::ImageLuma8(GrayImage::new(32, 32));
/// let mut source = StillFrameSource::new(blank);
/// assert!(source.acquire().is_ok());
/// assert!(source.acquire().is_ok());
/// assert_eq!(source.calls(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct StillFrameSource {
	frame: Option<Frame>,
	origin: String,
	calls: usize,
}

impl StillFrameSource {
	pub fn new(frame: Frame) -> StillFrameSource {
		return StillFrameSource {
			frame: Some(frame),
			origin: "still image".to_string(),
			calls: 0,
		};
	}

	/// A source that never yields a frame, as if the device were gone.
	pub fn unavailable() -> StillFrameSource {
		return StillFrameSource {
			frame: None,
			origin: "still image".to_string(),
			calls: 0,
		};
	}

	/// Load the frame from an image file.
	pub fn open(path: &Path) -> Result<StillFrameSource> {
		let data = std::fs::read(path).map_err(|e| Error::CaptureFailed {
			origin: path.display().to_string(),
			source: e,
		})?;
		let frame = image_decode::compressed_to_image(&data, 0, 0)
			.map_err(|e| Error::CaptureFailed {
				origin: path.display().to_string(),
				source: e,
			})?;
		let mut source = StillFrameSource::new(frame);
		source.origin = path.display().to_string();
		return Ok(source);
	}

	/// Number of `acquire` calls so far.
	pub fn calls(&self) -> usize {
		return self.calls;
	}
}

impl FrameSource for StillFrameSource {
	fn acquire(&mut self) -> Result<Frame> {
		self.calls += 1;
		return match &self.frame {
			Some(frame) => Ok(frame.clone()),
			None => Err(Error::CaptureFailed {
				origin: self.origin.clone(),
				source: io::Error::new(
					io::ErrorKind::NotFound, "no frame available"),
			}),
		};
	}
}
