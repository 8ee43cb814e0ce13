//! Headerless mono little-endian f32 files.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::trace;

use super::{frame_from_le_bytes, DecodedFrame, FrameSource};
use crate::error::{ClatterError, Result};

/// Samples handed out per frame.
pub const RAW_FRAME_SAMPLES: usize = 960;

const BYTES_PER_SAMPLE: u64 = 4;

/// Reads `f32le` mono PCM at a caller-supplied sample rate.
pub struct RawF32Source<R = BufReader<File>> {
    reader: R,
    sample_rate: u32,
    /// Index of the next sample to be read.
    position: u64,
    total_samples: u64,
    scratch: Vec<u8>,
}

impl RawF32Source {
    /// Open a raw file on disk.
    ///
    /// # Errors
    /// `ClatterError::Io` if the file cannot be opened, or
    /// `ClatterError::InvalidWindow` for a zero sample rate.
    pub fn open(path: &Path, sample_rate: u32) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Self::from_reader(BufReader::new(file), len, sample_rate)
    }
}

impl<R: Read + Seek> RawF32Source<R> {
    /// Wrap any seekable reader holding `byte_len` bytes of samples.
    pub fn from_reader(reader: R, byte_len: u64, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ClatterError::InvalidWindow(
                "raw sample rate must be positive".into(),
            ));
        }
        Ok(Self {
            reader,
            sample_rate,
            position: 0,
            total_samples: byte_len / BYTES_PER_SAMPLE,
            scratch: vec![0; RAW_FRAME_SAMPLES * BYTES_PER_SAMPLE as usize],
        })
    }
}

impl<R: Read + Seek> FrameSource for RawF32Source<R> {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        let target = (secs.max(0.0) * self.sample_rate as f64) as u64;
        // Land on a frame boundary at or before the target, like a codec would.
        let aligned = target - target % RAW_FRAME_SAMPLES as u64;
        self.position = aligned.min(self.total_samples);
        self.reader
            .seek(SeekFrom::Start(self.position * BYTES_PER_SAMPLE))?;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        let remaining = self.total_samples.saturating_sub(self.position);
        if remaining == 0 {
            return Ok(None);
        }

        let count = remaining.min(RAW_FRAME_SAMPLES as u64) as usize;
        let bytes = &mut self.scratch[..count * BYTES_PER_SAMPLE as usize];
        self.reader.read_exact(bytes)?;

        let time = self.position as f64 / self.sample_rate as f64;
        self.position += count as u64;
        trace!(time, frames = count, "read raw frame");

        Ok(Some(DecodedFrame::new(time, frame_from_le_bytes(bytes))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ramp_source(len: usize, rate: u32) -> RawF32Source<Cursor<Vec<u8>>> {
        let bytes: Vec<u8> = (0..len)
            .flat_map(|i| (i as f32).to_le_bytes())
            .collect();
        let byte_len = bytes.len() as u64;
        RawF32Source::from_reader(Cursor::new(bytes), byte_len, rate).unwrap()
    }

    #[test]
    fn yields_fixed_size_frames_then_tail() {
        let mut src = ramp_source(RAW_FRAME_SAMPLES + 10, 1000);
        let first = src.next_frame().unwrap().unwrap();
        assert_eq!(first.len(), RAW_FRAME_SAMPLES);
        assert_eq!(first.time, 0.0);
        let tail = src.next_frame().unwrap().unwrap();
        assert_eq!(tail.len(), 10);
        assert_eq!(tail.samples[0], RAW_FRAME_SAMPLES as f32);
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn seek_lands_on_frame_boundary_before_target() {
        let mut src = ramp_source(RAW_FRAME_SAMPLES * 4, 960);
        src.seek(2.5).unwrap();
        let frame = src.next_frame().unwrap().unwrap();
        assert_eq!(frame.time, 2.0);
        assert_eq!(frame.samples[0], (2 * RAW_FRAME_SAMPLES) as f32);
    }

    #[test]
    fn seek_past_end_exhausts() {
        let mut src = ramp_source(100, 1000);
        src.seek(60.0).unwrap();
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(RawF32Source::from_reader(Cursor::new(Vec::<u8>::new()), 0, 0).is_err());
    }
}
