//! Fixed-length, pre-zeroed sample buffer filled left to right.

use crate::buffering::clip::Clip;
use crate::error::{ClatterError, Result};

/// Largest window accepted: 2^30 samples, about 6.2 hours at 48 kHz.
pub const MAX_WINDOW_SAMPLES: usize = 1 << 30;

/// Collection buffer for one extraction window.
///
/// Never grows and never writes past its end: `push` copies at most the
/// remaining space and reports how much it took.
#[derive(Debug)]
pub struct SampleWindow {
    samples: Vec<f32>,
    cursor: usize,
    sample_rate: u32,
}

impl SampleWindow {
    /// Allocate `len` zeroed samples.
    ///
    /// # Errors
    /// `ClatterError::InvalidWindow` if `len` exceeds `MAX_WINDOW_SAMPLES`
    /// or the allocation fails.
    pub fn new(len: usize, sample_rate: u32) -> Result<Self> {
        if len > MAX_WINDOW_SAMPLES {
            return Err(ClatterError::InvalidWindow(format!(
                "{len} samples is more than the {MAX_WINDOW_SAMPLES} sample limit"
            )));
        }
        let mut samples = Vec::new();
        samples.try_reserve_exact(len).map_err(|e| {
            ClatterError::InvalidWindow(format!("cannot allocate {len} samples: {e}"))
        })?;
        samples.resize(len, 0.0);
        Ok(Self {
            samples,
            cursor: 0,
            sample_rate,
        })
    }

    /// Allocate a window holding `duration_secs` of audio at `sample_rate`,
    /// rounded to the nearest whole sample.
    pub fn for_duration(sample_rate: u32, duration_secs: f64) -> Result<Self> {
        Self::new(window_len(sample_rate, duration_secs)?, sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }

    pub fn is_full(&self) -> bool {
        self.cursor == self.samples.len()
    }

    /// Copy as much of `frame` as fits and advance the cursor.
    ///
    /// Returns the number of samples copied.
    pub fn push(&mut self, frame: &[f32]) -> usize {
        let take = self.remaining().min(frame.len());
        self.samples[self.cursor..self.cursor + take].copy_from_slice(&frame[..take]);
        self.cursor += take;
        take
    }

    pub fn into_clip(self) -> Clip {
        Clip::new(self.samples, self.sample_rate, self.cursor)
    }
}

/// Number of samples in `duration_secs` at `sample_rate`, rounded.
///
/// # Errors
/// `ClatterError::InvalidWindow` for a non-finite duration or a count above
/// `MAX_WINDOW_SAMPLES`.
pub fn window_len(sample_rate: u32, duration_secs: f64) -> Result<usize> {
    let count = (sample_rate as f64 * duration_secs.max(0.0)).round();
    if !count.is_finite() || count > MAX_WINDOW_SAMPLES as f64 {
        return Err(ClatterError::InvalidWindow(format!(
            "{duration_secs}s at {sample_rate} Hz is more than the {MAX_WINDOW_SAMPLES} sample limit"
        )));
    }
    Ok(count as usize)
}
