//! Single full-clip FFT: magnitude against frequency.

use rustfft::{num_complex::Complex, FftPlanner};

#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// `|X[k]|` for `k = 0..=n/2`.
    pub magnitudes: Vec<f32>,
    /// Frequency of each bin (Hz): `k * sample_rate / n`.
    pub frequencies: Vec<f32>,
}

impl Spectrum {
    /// One-sided FFT magnitude of the whole clip. Empty input gives an empty
    /// spectrum.
    pub fn compute(samples: &[f32], sample_rate: u32) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::default();
        }

        let fft = FftPlanner::<f32>::new().plan_fft_forward(n);
        let mut buf: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buf);

        let n_bins = n / 2 + 1;
        let magnitudes = buf[..n_bins].iter().map(|c| c.norm()).collect();
        let frequencies = (0..n_bins)
            .map(|k| (k as f64 * sample_rate as f64 / n as f64) as f32)
            .collect();

        Self {
            magnitudes,
            frequencies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Frequency of the strongest non-DC bin.
    pub fn peak_frequency(&self) -> Option<f32> {
        self.magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| self.frequencies[k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bins_cover_zero_to_nyquist() {
        let spectrum = Spectrum::compute(&vec![0.0; 48_000], 48_000);
        assert_eq!(spectrum.magnitudes.len(), 24_001);
        assert_eq!(spectrum.frequencies[0], 0.0);
        assert_eq!(spectrum.frequencies[24_000], 24_000.0);
    }

    #[test]
    fn constant_signal_is_all_dc() {
        let spectrum = Spectrum::compute(&[0.5; 64], 64);
        assert_relative_eq!(spectrum.magnitudes[0], 32.0, epsilon = 1e-4);
        assert!(spectrum.magnitudes[1..].iter().all(|&m| m < 1e-4));
    }

    #[test]
    fn finds_sine_peak() {
        let rate = 8000;
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin())
            .collect();
        let spectrum = Spectrum::compute(&samples, rate);
        assert_eq!(spectrum.peak_frequency(), Some(440.0));
    }

    #[test]
    fn empty_input_is_empty() {
        let spectrum = Spectrum::compute(&[], 48_000);
        assert!(spectrum.is_empty());
        assert_eq!(spectrum.peak_frequency(), None);
    }
}
