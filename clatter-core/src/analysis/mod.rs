//! Frequency-domain views of a collected clip.
//!
//! `Spectrogram` is the primary view (short-time power spectral density);
//! `Spectrum` is a single full-clip FFT, only computed when asked for.
//! Both use `rustfft`; rendering lives behind the `Visualizer` trait.

pub mod spectrogram;
pub mod spectrum;

pub use spectrogram::Spectrogram;
pub use spectrum::Spectrum;

use crate::error::Result;

/// Anything that can put an analysis result in front of a human.
///
/// Implementations block until the view is dismissed (or written out).
pub trait Visualizer {
    fn show_spectrogram(&mut self, spectrogram: &Spectrogram, title: &str) -> Result<()>;

    fn show_spectrum(&mut self, spectrum: &Spectrum, title: &str) -> Result<()>;
}

pub(crate) fn build_hann_window(n: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos()))
        .collect()
}
