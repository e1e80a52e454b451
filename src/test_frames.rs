//! Frames with real QR-codes in them, rendered in memory.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Luma};
use qrcode::{Color, QrCode};

use crate::frame_source::Frame;

const MODULE_PX: u32 = 6;
const QUIET_ZONE: u32 = 4;

/// `payload` as a black-on-white QR-code with a quiet zone around it.
pub fn qr_frame(payload: &str) -> Frame {
	let code = QrCode::new(payload.as_bytes()).unwrap();
	let modules = code.width() as u32;
	let colors = code.to_colors();
	let size = (modules + 2 * QUIET_ZONE) * MODULE_PX;
	let img = GrayImage::from_fn(size, size, |x, y| {
		let mx = x / MODULE_PX;
		let my = y / MODULE_PX;
		let inside =
			mx >= QUIET_ZONE && mx < QUIET_ZONE + modules &&
			my >= QUIET_ZONE && my < QUIET_ZONE + modules;
		if inside {
			let i = ((my - QUIET_ZONE) * modules + (mx - QUIET_ZONE)) as usize;
			if colors[i] == Color::Dark {
				return Luma([0]);
			}
		}
		return Luma([255]);
	});
	return DynamicImage::ImageLuma8(img);
}

/// Save [`qr_frame`] as a PNG in `dir`.
pub fn qr_png(dir: &Path, payload: &str) -> PathBuf {
	let path = dir.join("qr.png");
	qr_frame(payload).save(&path).unwrap();
	return path;
}
