//! Audio sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Playback runs at a fixed device rate (48 kHz unless configured
//! otherwise) while source files come at whatever rate they were encoded
//! with. `RateConverter` bridges that gap on the decoding thread, where
//! allocation is allowed.
//!
//! When source rate == device rate, `RateConverter` is a passthrough and no
//! rubato session is created at all.
//!
//! ## Usage
//!
//! ```ignore
//! let mut rc = RateConverter::new(44_100, 48_000, 1024)?;
//! let mut out = rc.process(&decoded);
//! out.extend(rc.flush());
//! ```

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::error;

use crate::error::{ClatterError, Result};

/// Converts f32 mono audio from one fixed sample rate to another.
pub struct RateConverter {
    /// `None` when source rate == target rate (passthrough mode).
    resampler: Option<FastFixedIn<f32>>,
    /// Accumulation buffer. Holds partial input chunks between calls.
    input_buf: Vec<f32>,
    /// How many input samples rubato expects per process call.
    chunk_size: usize,
    /// Pre-allocated output buffer: `[1][output_frames_max]`.
    output_buf: Vec<Vec<f32>>,
    ratio: f64,
}

impl RateConverter {
    /// Create a new converter.
    ///
    /// # Parameters
    /// - `source_rate`: Sample rate of the decoded audio (Hz).
    /// - `target_rate`: Sample rate of the output device (Hz).
    /// - `chunk_size`: Input frame count per rubato call (e.g. `1024`).
    ///
    /// # Errors
    /// Returns `ClatterError::AudioStream` if rubato fails to initialise.
    pub fn new(source_rate: u32, target_rate: u32, chunk_size: usize) -> Result<Self> {
        if source_rate == target_rate {
            return Ok(Self {
                resampler: None,
                input_buf: Vec::new(),
                chunk_size,
                output_buf: Vec::new(),
                ratio: 1.0,
            });
        }

        let ratio = target_rate as f64 / source_rate as f64;

        let resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0, // fixed ratio, no dynamic adjustment
            PolynomialDegree::Cubic,
            chunk_size,
            1, // mono
        )
        .map_err(|e| ClatterError::AudioStream(format!("resampler init: {e}")))?;

        let max_out = resampler.output_frames_max();
        let output_buf = vec![vec![0f32; max_out]; 1];

        tracing::debug!(
            source_rate,
            target_rate,
            chunk_size,
            max_out,
            "resampling enabled from={} to={}",
            source_rate,
            target_rate
        );

        Ok(Self {
            resampler: Some(resampler),
            input_buf: Vec::new(),
            chunk_size,
            output_buf,
            ratio,
        })
    }

    /// Process incoming samples, returning resampled output (may be empty).
    ///
    /// Samples are accumulated internally until a full `chunk_size` block is
    /// available for rubato. Any remainder is kept for the next call.
    ///
    /// In passthrough mode (same rates), input is returned directly.
    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        if self.resampler.is_none() {
            return samples.to_vec();
        }

        self.input_buf.extend_from_slice(samples);

        let mut result = Vec::new();
        while self.input_buf.len() >= self.chunk_size {
            self.run_chunk(&mut result, usize::MAX);
            self.input_buf.drain(..self.chunk_size);
        }
        result
    }

    /// Push out whatever partial chunk is still buffered, zero-padded, and
    /// trimmed to the length it represents at the target rate.
    pub fn flush(&mut self) -> Vec<f32> {
        let mut result = Vec::new();
        if self.resampler.is_none() || self.input_buf.is_empty() {
            return result;
        }

        let pending = self.input_buf.len();
        self.input_buf.resize(self.chunk_size, 0.0);
        let keep = (pending as f64 * self.ratio).ceil() as usize;
        self.run_chunk(&mut result, keep);
        self.input_buf.clear();
        result
    }

    /// Returns `true` when source rate == target rate (no resampling occurs).
    pub fn is_passthrough(&self) -> bool {
        self.resampler.is_none()
    }

    fn run_chunk(&mut self, result: &mut Vec<f32>, limit: usize) {
        let Some(ref mut resampler) = self.resampler else {
            return;
        };
        let input_slice = &self.input_buf[..self.chunk_size];

        match resampler.process_into_buffer(&[input_slice], &mut self.output_buf, None) {
            Ok((_consumed, produced)) => {
                let produced = produced.min(limit);
                result.extend_from_slice(&self.output_buf[0][..produced]);
            }
            Err(e) => {
                error!("resampler process error: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_identity() {
        let mut rc = RateConverter::new(48_000, 48_000, 1024).unwrap();
        assert!(rc.is_passthrough());
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        let out = rc.process(&samples);
        assert_eq!(out, samples);
        assert!(rc.flush().is_empty());
    }

    #[test]
    fn ratio_24k_to_48k_correct_length() {
        let mut rc = RateConverter::new(24_000, 48_000, 1024).unwrap();
        assert!(!rc.is_passthrough());
        let out = rc.process(&vec![0.0f32; 1024]);
        assert!(!out.is_empty(), "expected non-empty output");
        let expected = 2048usize;
        assert!(
            (out.len() as isize - expected as isize).unsigned_abs() <= 16,
            "output len={} expected≈{}",
            out.len(),
            expected
        );
    }

    #[test]
    fn partial_accumulation_returns_empty() {
        let mut rc = RateConverter::new(44_100, 48_000, 1024).unwrap();
        let out = rc.process(&vec![0.0f32; 500]);
        assert!(
            out.is_empty(),
            "expected empty output for partial chunk, got {}",
            out.len()
        );
    }

    #[test]
    fn flush_emits_the_pending_tail() {
        let mut rc = RateConverter::new(24_000, 48_000, 1024).unwrap();
        assert!(rc.process(&vec![0.1f32; 300]).is_empty());
        let tail = rc.flush();
        assert!(!tail.is_empty());
        assert!(tail.len() <= 600, "tail len={}", tail.len());
        assert!(rc.flush().is_empty(), "second flush has nothing left");
    }
}
