//! Frame sources: anything that can seek and hand out decoded audio frames.
//!
//! The `FrameSource` trait is the seam between the collector and the codec
//! library. `SymphoniaSource` covers real containers; `RawF32Source` reads
//! headerless little-endian float files.

pub mod container;
pub mod raw;

pub use container::SymphoniaSource;
pub use raw::RawF32Source;

use std::path::Path;

use crate::error::Result;

/// One decoded unit of audio.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Presentation time of the first sample, in seconds.
    pub time: f64,
    /// First channel plane as f32.
    pub samples: Vec<f32>,
}

impl DecodedFrame {
    pub fn new(time: f64, samples: Vec<f32>) -> Self {
        Self { time, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A seekable stream of decoded frames from a single audio track.
pub trait FrameSource {
    /// Sample rate of the decoded audio (Hz).
    fn sample_rate(&self) -> u32;

    /// Reposition so the next frames start at or before `secs`.
    ///
    /// Best-effort: codecs may land a little early, so callers drop frames
    /// whose time is still before the target.
    fn seek(&mut self, secs: f64) -> Result<()>;

    /// Decode the next frame, or `None` when the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        (**self).seek(secs)
    }

    fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        (**self).next_frame()
    }
}

/// Reinterpret a raw plane of little-endian 4-byte floats.
///
/// Trailing bytes that do not form a whole sample are ignored.
pub fn frame_from_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Open `path` with the decoder matching how it should be read.
///
/// `raw_rate` selects the headerless f32 reader at that sample rate;
/// otherwise the container is probed.
pub fn open_source(path: &Path, raw_rate: Option<u32>) -> Result<Box<dyn FrameSource>> {
    match raw_rate {
        Some(rate) => Ok(Box::new(RawF32Source::open(path, rate)?)),
        None => Ok(Box::new(SymphoniaSource::open(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_bytes_decode_to_floats() {
        let mut bytes = Vec::new();
        for v in [0.5f32, -1.0, 0.25] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.push(0xff); // dangling partial sample
        assert_eq!(frame_from_le_bytes(&bytes), vec![0.5, -1.0, 0.25]);
    }

    #[test]
    fn empty_plane_is_empty_frame() {
        assert!(frame_from_le_bytes(&[]).is_empty());
        assert!(DecodedFrame::new(0.0, vec![]).is_empty());
    }
}
