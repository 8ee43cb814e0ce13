//! Short-time Fourier transform power spectrogram.
//!
//! Scaling follows the usual PSD convention: Hann-windowed frames, power
//! normalised by `sample_rate * Σw²`, interior bins doubled for the one-sided
//! spectrum, then converted to dB.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::build_hann_window;
use crate::error::{ClatterError, Result};

/// Default FFT length per frame.
pub const DEFAULT_FFT_SIZE: usize = 256;
/// Default overlap between consecutive frames.
pub const DEFAULT_OVERLAP: usize = 128;

/// Power floor applied before taking the log.
const POWER_FLOOR: f32 = 1e-20;

#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// `power_db[frame][bin]`, dB.
    pub power_db: Vec<Vec<f32>>,
    /// Centre frequency of each bin (Hz), `fft_size / 2 + 1` entries.
    pub frequencies: Vec<f32>,
    /// Centre time of each frame (s) relative to the clip start.
    pub times: Vec<f32>,
    pub sample_rate: u32,
    pub fft_size: usize,
}

impl Spectrogram {
    /// Compute the spectrogram of `samples`.
    ///
    /// Clips shorter than one frame are zero-padded to a single frame.
    ///
    /// # Errors
    /// `ClatterError::Analysis` if `fft_size < 2`, `overlap >= fft_size` or
    /// `sample_rate == 0`.
    pub fn compute(
        samples: &[f32],
        sample_rate: u32,
        fft_size: usize,
        overlap: usize,
    ) -> Result<Self> {
        if fft_size < 2 || overlap >= fft_size || sample_rate == 0 {
            return Err(ClatterError::Analysis(format!(
                "invalid spectrogram parameters: fft_size={fft_size} overlap={overlap} sample_rate={sample_rate}"
            )));
        }

        let hop = fft_size - overlap;
        let n_bins = fft_size / 2 + 1;
        let window = build_hann_window(fft_size);
        let window_power: f32 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (sample_rate as f32 * window_power);
        let fft: Arc<dyn Fft<f32>> = FftPlanner::<f32>::new().plan_fft_forward(fft_size);

        let padded;
        let samples = if samples.len() < fft_size {
            padded = {
                let mut v = samples.to_vec();
                v.resize(fft_size, 0.0);
                v
            };
            &padded[..]
        } else {
            samples
        };

        let n_frames = (samples.len() - fft_size) / hop + 1;
        let mut power_db = Vec::with_capacity(n_frames);
        let mut times = Vec::with_capacity(n_frames);
        let mut fft_buf = vec![Complex::new(0.0f32, 0.0); fft_size];

        for frame in 0..n_frames {
            let start = frame * hop;
            for (i, slot) in fft_buf.iter_mut().enumerate() {
                *slot = Complex::new(samples[start + i] * window[i], 0.0);
            }
            fft.process(&mut fft_buf);

            let row = (0..n_bins)
                .map(|k| {
                    let mut p = fft_buf[k].norm_sqr() * scale;
                    let is_edge = k == 0 || (fft_size % 2 == 0 && k == n_bins - 1);
                    if !is_edge {
                        p *= 2.0;
                    }
                    10.0 * p.max(POWER_FLOOR).log10()
                })
                .collect();
            power_db.push(row);
            times.push((start + fft_size / 2) as f32 / sample_rate as f32);
        }

        let frequencies = (0..n_bins)
            .map(|k| k as f32 * sample_rate as f32 / fft_size as f32)
            .collect();

        Ok(Self {
            power_db,
            frequencies,
            times,
            sample_rate,
            fft_size,
        })
    }

    pub fn n_frames(&self) -> usize {
        self.power_db.len()
    }

    pub fn n_bins(&self) -> usize {
        self.frequencies.len()
    }

    /// Frequency of the bin with the highest power averaged over all frames.
    pub fn peak_frequency(&self) -> Option<f32> {
        if self.power_db.is_empty() {
            return None;
        }
        let mut mean = vec![0.0f32; self.n_bins()];
        for row in &self.power_db {
            for (acc, db) in mean.iter_mut().zip(row) {
                *acc += db;
            }
        }
        mean.iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| self.frequencies[k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sine(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn frame_and_bin_counts_follow_hop() {
        let spec = Spectrogram::compute(&vec![0.0; 1024], 8000, 256, 128).unwrap();
        assert_eq!(spec.n_frames(), 7);
        assert_eq!(spec.n_bins(), 129);
        assert_eq!(spec.frequencies[128], 4000.0);
        assert_abs_diff_eq!(spec.times[0], 128.0 / 8000.0);
    }

    #[test]
    fn short_clip_is_padded_to_one_frame() {
        let spec = Spectrogram::compute(&[0.5; 10], 1000, 256, 128).unwrap();
        assert_eq!(spec.n_frames(), 1);
    }

    #[test]
    fn sine_peaks_at_its_frequency() {
        // 1 kHz lands exactly on bin 32 at 8 kHz / 256
        let spec = Spectrogram::compute(&sine(1000.0, 8000, 4096), 8000, 256, 128).unwrap();
        assert_eq!(spec.peak_frequency(), Some(1000.0));
    }

    #[test]
    fn silence_sits_at_the_floor() {
        let spec = Spectrogram::compute(&vec![0.0; 512], 8000, 256, 128).unwrap();
        assert!(spec.power_db.iter().flatten().all(|&db| db < -199.0));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(Spectrogram::compute(&[0.0; 512], 8000, 256, 256).is_err());
        assert!(Spectrogram::compute(&[0.0; 512], 8000, 1, 0).is_err());
        assert!(Spectrogram::compute(&[0.0; 512], 0, 256, 128).is_err());
    }
}
