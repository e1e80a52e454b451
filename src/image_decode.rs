use std::io;
use std::io::Cursor;

use ffimage::color::Rgb;
use ffimage::iter::{BytesExt, ColorConvertExt, PixelsExt};
use ffimage_yuv::{yuv::Yuv, yuv422::Yuv422};
use image::io::Reader as ImageReader;
use image::DynamicImage;
use v4l::FourCC;

/// Turns a raw camera buffer of known size into an image.
pub type Converter = fn(&[u8], u32, u32) -> io::Result<DynamicImage>;

fn conversion_error(what: &str) -> io::Error {
	return io::Error::new(io::ErrorKind::InvalidData, what.to_string());
}

pub fn yuyv_to_image(
	src: &[u8],
	width: u32,
	height: u32,
) -> io::Result<DynamicImage> {
	let expected = (width as usize) * (height as usize) * 2;
	if src.len() < expected {
		return Err(conversion_error("YUYV buffer shorter than frame"));
	}
	let mut rgb = vec![0; (width * height * 3) as usize];
	src[..expected].iter()
		.copied()
		.pixels::<Yuv422<u8, 0, 2, 1, 3>>()
		.colorconvert::<[Yuv<u8>; 2]>()
		.flatten()
		.colorconvert::<Rgb<u8>>()
		.bytes()
		.write(&mut rgb);
	return match image::RgbImage::from_vec(width, height, rgb) {
		Some(i) => Ok(DynamicImage::ImageRgb8(i)),
		None => Err(conversion_error("YUYV frame has wrong dimensions")),
	};
}

/// Decodes a compressed frame (MJPG, or any still image format the
/// `image` crate recognises). Width and height come from the payload.
pub fn compressed_to_image(
	src: &[u8],
	_width: u32,
	_height: u32,
) -> io::Result<DynamicImage> {
	let reader = ImageReader::new(Cursor::new(src)).with_guessed_format()?;
	return reader.decode().map_err(|e| {
		log::debug!("{}", e);
		conversion_error("failed to decode compressed frame")
	});
}

pub fn converter_for_fourcc(fourcc: &FourCC) -> io::Result<Converter> {
	if *fourcc == FourCC::new(b"YUYV") {
		return Ok(yuyv_to_image);
	}
	if *fourcc == FourCC::new(b"MJPG") {
		return Ok(compressed_to_image);
	}
	return Err(io::Error::new(
		io::ErrorKind::InvalidInput,
		format!("unsupported camera format {}", fourcc)));
}
