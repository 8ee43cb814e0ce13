//! The finished result of one extraction window.

/// A contiguous block of mono PCM samples at a known sample rate.
///
/// `samples` always has the full requested length; anything past `filled`
/// is the zero padding left when the source ran out early.
#[derive(Debug, Clone)]
pub struct Clip {
    /// Mono f32 samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Number of samples actually decoded into `samples`.
    pub filled: usize,
}

impl Clip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, filled: usize) -> Self {
        Self {
            samples,
            sample_rate,
            filled,
        }
    }

    /// Returns the duration of this clip in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the clip has no room for samples at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns true if the source ran out before the window was full.
    pub fn is_partial(&self) -> bool {
        self.filled < self.samples.len()
    }
}
