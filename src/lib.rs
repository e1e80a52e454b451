//! Poll a video4linux camera until a QR-code shows up, then record the
//! outcome in an append-only CSV log.
//!
//! The pieces are usable on their own: a [`FrameSource`] hands out
//! frames, a [`Decoder`] finds codes in them, the [`Poller`] drives both
//! until something is found or time runs out, and [`append_log`] keeps
//! the record.

pub mod app;
pub mod cli;
pub mod decoder;
mod error;
pub mod frame_source;
mod image_decode;
pub mod poller;
pub mod runtime_log;
#[cfg(test)]
mod test_frames;

pub use decoder::{BarDecoder, Decoder, DecoderKind, RxingDecoder};
pub use error::{Error, Result};
pub use frame_source::{
	Frame, FrameSource, StillFrameSource, TargetFrameSize, V4lFrameSource};
pub use poller::Poller;
pub use runtime_log::{append_log, LogRecord};
