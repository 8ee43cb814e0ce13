//! `Session`: one opened audio file and the seek/collect/sink cycle run on it.
//!
//! ## Cycle (per window)
//!
//! ```text
//! Session::run_window(window)
//!     ├─► collect_window_with()   seek, skip early frames, fill SampleWindow
//!     │       └─► AudioSink::write(frame)        (PlayMode::Streamed)
//!     ├─► Spectrogram::compute → Visualizer     (unless analysis is off)
//!     ├─► Spectrum::compute    → Visualizer     (only with `spectrum`)
//!     └─► AudioSink::write(clip)                (PlayMode::Buffered)
//! ```
//!
//! Everything runs on the calling thread. The sinks are borrowed for the
//! duration of one call; whoever opened them is responsible for dropping
//! them, which releases the device.

use tracing::{debug, info, warn};

use crate::{
    analysis::{
        spectrogram::{DEFAULT_FFT_SIZE, DEFAULT_OVERLAP},
        Spectrogram, Spectrum, Visualizer,
    },
    audio::{AudioSink, DEFAULT_PLAYBACK_RATE},
    buffering::clip::Clip,
    decode::FrameSource,
    error::Result,
    extract::{collect_window_with, Window},
};

/// When playback happens relative to collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Write each decoded frame as soon as it is accepted.
    Streamed,
    /// Write the finished clip after analysis.
    Buffered,
}

/// Configuration for `Session`.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Rate requested from the output device (Hz). Default: 48000.
    pub playback_rate: u32,
    /// Input frames per resampler call when source and device rates differ.
    /// Default: 1024.
    pub resample_chunk: usize,
    /// Preferred output device name. `None` uses the system default.
    pub output_device: Option<String>,
    /// Playback mode, or `None` to stay silent.
    pub play: Option<PlayMode>,
    /// Show the spectrogram of each window. Default: true.
    pub analyze: bool,
    /// Also show the full-window FFT magnitude. Default: false.
    pub spectrum: bool,
    /// FFT length per spectrogram frame. Default: 256.
    pub fft_size: usize,
    /// Overlap between spectrogram frames. Default: 128.
    pub fft_overlap: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            playback_rate: DEFAULT_PLAYBACK_RATE,
            resample_chunk: 1024,
            output_device: None,
            play: None,
            analyze: true,
            spectrum: false,
            fft_size: DEFAULT_FFT_SIZE,
            fft_overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Counters accumulated over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub windows: usize,
    pub partial_windows: usize,
    pub samples_collected: usize,
}

/// An opened audio source plus the configuration to process windows of it.
pub struct Session<S: FrameSource + ?Sized> {
    config: ExtractConfig,
    stats: SessionStats,
    source: Box<S>,
}

impl<S: FrameSource + ?Sized> Session<S> {
    pub fn new(config: ExtractConfig, source: Box<S>) -> Self {
        debug!(?config, sample_rate = source.sample_rate(), "session created");
        Self {
            config,
            stats: SessionStats::default(),
            source,
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Run one seek/collect/sink cycle.
    ///
    /// `audio` is only written to when `config.play` is set. Returns the
    /// collected clip.
    pub fn run_window(
        &mut self,
        window: &Window,
        title: &str,
        visualizer: &mut dyn Visualizer,
        mut audio: Option<&mut dyn AudioSink>,
    ) -> Result<Clip> {
        let streamed = self.config.play == Some(PlayMode::Streamed);
        let buffered = self.config.play == Some(PlayMode::Buffered);

        if self.config.play.is_some() && audio.is_none() {
            warn!("playback requested but no audio sink is open");
        }

        let clip = collect_window_with(self.source.as_mut(), window, |frame| {
            match audio.as_deref_mut() {
                Some(sink) if streamed => sink.write(&frame.samples),
                _ => Ok(()),
            }
        })?;

        if streamed {
            if let Some(sink) = audio.as_deref_mut() {
                sink.finish()?;
            }
        }

        self.stats.windows += 1;
        self.stats.samples_collected += clip.filled;
        if clip.is_partial() {
            self.stats.partial_windows += 1;
        }

        info!(
            start = window.start.unwrap_or(0.0),
            duration = window.duration,
            samples = clip.samples.len(),
            filled = clip.filled,
            "window ready"
        );

        if self.config.analyze {
            let spectrogram = Spectrogram::compute(
                &clip.samples,
                clip.sample_rate,
                self.config.fft_size,
                self.config.fft_overlap,
            )?;
            debug!(
                frames = spectrogram.n_frames(),
                bins = spectrogram.n_bins(),
                peak_hz = ?spectrogram.peak_frequency(),
                "spectrogram computed"
            );
            visualizer.show_spectrogram(&spectrogram, title)?;

            if self.config.spectrum {
                let spectrum = Spectrum::compute(&clip.samples, clip.sample_rate);
                if spectrum.is_empty() {
                    warn!("window holds no samples, skipping the spectrum plot");
                } else {
                    debug!(peak_hz = ?spectrum.peak_frequency(), "spectrum computed");
                    visualizer.show_spectrum(&spectrum, title)?;
                }
            }
        }

        if buffered {
            if let Some(sink) = audio.as_deref_mut() {
                sink.write(&clip.samples)?;
                sink.finish()?;
            }
        }

        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedFrame;

    struct ToneSource {
        rate: u32,
        next: usize,
        frame_len: usize,
    }

    impl FrameSource for ToneSource {
        fn sample_rate(&self) -> u32 {
            self.rate
        }

        fn seek(&mut self, secs: f64) -> Result<()> {
            self.next = (secs * self.rate as f64) as usize;
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
            let time = self.next as f64 / self.rate as f64;
            let samples = (self.next..self.next + self.frame_len)
                .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
                .collect();
            self.next += self.frame_len;
            Ok(Some(DecodedFrame::new(time, samples)))
        }
    }

    #[derive(Default)]
    struct RecordingVisualizer {
        spectrograms: Vec<String>,
        spectra: usize,
    }

    impl Visualizer for RecordingVisualizer {
        fn show_spectrogram(&mut self, _s: &Spectrogram, title: &str) -> Result<()> {
            self.spectrograms.push(title.to_string());
            Ok(())
        }

        fn show_spectrum(&mut self, _s: &Spectrum, _title: &str) -> Result<()> {
            self.spectra += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<usize>,
        finishes: usize,
    }

    impl AudioSink for RecordingSink {
        fn write(&mut self, samples: &[f32]) -> Result<()> {
            self.writes.push(samples.len());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    fn session(config: ExtractConfig) -> Session<ToneSource> {
        Session::new(
            config,
            Box::new(ToneSource {
                rate: 8000,
                next: 0,
                frame_len: 1000,
            }),
        )
    }

    #[test]
    fn streamed_playback_writes_every_accepted_frame() {
        let mut s = session(ExtractConfig {
            play: Some(PlayMode::Streamed),
            analyze: false,
            ..ExtractConfig::default()
        });
        let mut viz = RecordingVisualizer::default();
        let mut sink = RecordingSink::default();
        let window = Window::new(Some(1.0), 0.5).unwrap();
        let clip = s.run_window(&window, "t", &mut viz, Some(&mut sink)).unwrap();

        assert_eq!(clip.samples.len(), 4000);
        assert_eq!(sink.writes, vec![1000; 4]);
        assert_eq!(sink.finishes, 1);
        assert!(viz.spectrograms.is_empty());
    }

    #[test]
    fn buffered_playback_writes_the_clip_once_after_analysis() {
        let mut s = session(ExtractConfig {
            play: Some(PlayMode::Buffered),
            ..ExtractConfig::default()
        });
        let mut viz = RecordingVisualizer::default();
        let mut sink = RecordingSink::default();
        let window = Window::new(None, 0.25).unwrap();
        s.run_window(&window, "Spectrogram", &mut viz, Some(&mut sink))
            .unwrap();

        assert_eq!(sink.writes, vec![2000]);
        assert_eq!(sink.finishes, 1);
        assert_eq!(viz.spectrograms, vec!["Spectrogram".to_string()]);
        assert_eq!(viz.spectra, 0);
    }

    #[test]
    fn spectrum_flag_adds_the_fft_view() {
        let mut s = session(ExtractConfig {
            spectrum: true,
            ..ExtractConfig::default()
        });
        let mut viz = RecordingVisualizer::default();
        s.run_window(&Window::new(None, 0.1).unwrap(), "x", &mut viz, None)
            .unwrap();
        assert_eq!(viz.spectrograms.len(), 1);
        assert_eq!(viz.spectra, 1);
    }

    #[test]
    fn zero_length_window_still_plots_the_padded_spectrogram() {
        let mut s = session(ExtractConfig {
            spectrum: true,
            ..ExtractConfig::default()
        });
        let mut viz = RecordingVisualizer::default();
        let clip = s
            .run_window(&Window::new(None, 0.0).unwrap(), "empty", &mut viz, None)
            .unwrap();
        assert!(clip.is_empty());
        assert_eq!(viz.spectrograms.len(), 1);
        assert_eq!(viz.spectra, 0);
    }

    #[test]
    fn stats_accumulate_across_windows() {
        let mut s = session(ExtractConfig {
            analyze: false,
            ..ExtractConfig::default()
        });
        let mut viz = RecordingVisualizer::default();
        for start in [0.0, 2.0, 4.0] {
            let w = Window::new(Some(start), 0.5).unwrap();
            s.run_window(&w, "w", &mut viz, None).unwrap();
        }
        assert_eq!(
            s.stats(),
            SessionStats {
                windows: 3,
                partial_windows: 0,
                samples_collected: 12_000,
            }
        );
    }
}
