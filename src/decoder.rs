use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use rxing::{
	BarcodeFormat, DecodeHintType, DecodeHintValue, DecodingHintDictionary};

use crate::frame_source::Frame;

/// Finds and decodes QR-codes in a frame.
pub trait Decoder {
	/// All non-empty payloads found in `frame`, or `None` if there are
	/// none. Decoding errors are reported as `None` as well.
	fn decode(&self, frame: &Frame) -> Option<Vec<String>>;
}

/// Available decoding backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DecoderKind {
	#[default]
	Bardecoder,
	Rxing,
}

pub fn for_kind(kind: DecoderKind) -> Box<dyn Decoder> {
	return match kind {
		DecoderKind::Bardecoder => Box::new(BarDecoder::new()),
		DecoderKind::Rxing => Box::new(RxingDecoder),
	};
}

fn non_empty(payloads: Vec<String>) -> Option<Vec<String>> {
	let payloads: Vec<String> = payloads.into_iter()
		.filter(|p| !p.is_empty())
		.collect();
	if payloads.is_empty() {
		return None;
	}
	return Some(payloads);
}

type DefaultDecoder = bardecoder::Decoder<
	image::DynamicImage,
	image::ImageBuffer<image::Luma<u8>, Vec<u8>>,
	String>;

/// Decoder backed by `bardecoder`.
pub struct BarDecoder {
	inner: DefaultDecoder,
}

impl BarDecoder {
	pub fn new() -> BarDecoder {
		return BarDecoder { inner: bardecoder::default_decoder() };
	}
}

impl Default for BarDecoder {
	fn default() -> Self {
		return BarDecoder::new();
	}
}

impl Decoder for BarDecoder {
	fn decode(&self, frame: &Frame) -> Option<Vec<String>> {
		let mut payloads = Vec::new();
		for r in self.inner.decode(frame) {
			match r {
				Ok(inner) => payloads.push(inner),
				Err(e) => log::warn!("Error decoding QR code: {}", e),
			}
		}
		return non_empty(payloads);
	}
}

// rxing tries every symbology unless told otherwise
fn qr_only_hints() -> DecodingHintDictionary {
	return HashMap::from([(
		DecodeHintType::POSSIBLE_FORMATS,
		DecodeHintValue::PossibleFormats(
			HashSet::from([BarcodeFormat::QR_CODE])),
	)]);
}

/// Decoder backed by `rxing`, a port of ZXing, limited to QR-codes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RxingDecoder;

impl Decoder for RxingDecoder {
	fn decode(&self, frame: &Frame) -> Option<Vec<String>> {
		let luma = frame.to_luma8();
		let (width, height) = luma.dimensions();
		let mut hints = qr_only_hints();
		let results = match rxing::helpers::detect_multiple_in_luma_with_hints(
			luma.into_raw(), width, height, &mut hints) {
			Ok(r) => r,
			Err(e) => {
				log::debug!("rxing found no code: {}", e);
				return None;
			}
		};
		return non_empty(results.iter()
			.filter(|r| *r.getBarcodeFormat() == BarcodeFormat::QR_CODE)
			.map(|r| r.getText().to_string())
			.collect());
	}
}
