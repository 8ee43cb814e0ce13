//! # clatter-core
//!
//! Pull a time window out of an audio file, look at it, listen to it.
//!
//! ## Architecture
//!
//! ```text
//! "1m3s" → parse_time → Window ─┐
//! annotation file → Annotation ─┤
//!                               ▼
//! FrameSource::seek → next_frame → SampleWindow (bounded) → Clip
//!                          │                                 │
//!                  AudioSink (streamed)        Spectrogram / Spectrum → Visualizer
//!                                                            │
//!                                                  AudioSink (buffered)
//!
//! AudioSink = Playback: RateConverter → SPSC RingBuffer → cpal callback
//! ```
//!
//! The output callback is zero-alloc. Decoding, resampling and analysis all
//! happen on the caller's thread.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod analysis;
pub mod annotation;
pub mod audio;
pub mod buffering;
pub mod decode;
pub mod engine;
pub mod error;
pub mod extract;
pub mod time;

// Convenience re-exports for downstream crates
pub use analysis::{Spectrogram, Spectrum, Visualizer};
pub use annotation::{read_annotations, Annotation};
pub use audio::{AudioSink, Playback};
pub use buffering::clip::Clip;
pub use decode::{open_source, FrameSource};
pub use engine::{ExtractConfig, PlayMode, Session, SessionStats};
pub use error::{ClatterError, Result};
pub use extract::{collect_window, Window};
pub use time::{parse_time, TimeSpec};
