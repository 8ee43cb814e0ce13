//! End-to-end extraction from real WAV files written with `hound`.

use std::path::PathBuf;

use approx::assert_relative_eq;
use clatter_core::{
    analysis::{Spectrogram, Spectrum, Visualizer},
    collect_window,
    decode::{open_source, FrameSource, SymphoniaSource},
    AudioSink, ClatterError, ExtractConfig, PlayMode, Result, Session, Window,
};

const RATE: u32 = 48_000;

fn temp_wav(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("clatter-{}-{name}.wav", std::process::id()))
}

fn write_mono_f32(name: &str, samples: impl IntoIterator<Item = f32>) -> PathBuf {
    let path = temp_wav(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn one_second_of_a_constant_stream() {
    let path = write_mono_f32("constant", std::iter::repeat(0.25).take(2 * RATE as usize));
    let mut source = SymphoniaSource::open(&path).unwrap();
    assert_eq!(source.sample_rate(), RATE);
    assert_eq!(source.path(), path.as_path());

    let clip = collect_window(&mut source, &Window::new(None, 1.0).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(clip.samples.len(), 48_000);
    assert_eq!(clip.filled, 48_000);
    assert!(clip.samples.iter().all(|&s| s == 0.25));
}

#[test]
fn seek_then_collect_only_post_start_samples() {
    // 0.0 for the first second, 1.0 for the second.
    let samples = (0..2 * RATE as usize).map(|i| if i < RATE as usize { 0.0 } else { 1.0 });
    let path = write_mono_f32("step", samples);
    let mut source = open_source(&path, None).unwrap();

    let clip = collect_window(&mut source, &Window::new(Some(1.0), 0.5).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(clip.samples.len(), 24_000);
    assert!(clip.filled > 0);
    assert!(
        clip.samples[..clip.filled].iter().all(|&s| s == 1.0),
        "pre-start samples leaked into the window"
    );
}

#[test]
fn window_past_the_end_is_zero_padded() {
    let path = write_mono_f32("short", std::iter::repeat(0.5).take(RATE as usize / 2));
    let mut source = SymphoniaSource::open(&path).unwrap();

    let clip = collect_window(&mut source, &Window::new(None, 1.0).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(clip.samples.len(), 48_000);
    assert_eq!(clip.filled, 24_000);
    assert!(clip.is_partial());
    assert!(clip.samples[24_000..].iter().all(|&s| s == 0.0));
}

#[test]
fn stereo_files_use_the_first_channel() {
    let path = temp_wav("stereo");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..RATE / 10 {
        writer.write_sample(0.75f32).unwrap();
        writer.write_sample(-0.75f32).unwrap();
    }
    writer.finalize().unwrap();

    let mut source = SymphoniaSource::open(&path).unwrap();
    let clip = collect_window(&mut source, &Window::new(None, 0.05).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(clip.samples.len(), 2_400);
    assert!(clip.samples.iter().all(|&s| s == 0.75));
}

#[test]
fn garbage_is_rejected_as_unsupported() {
    let path = temp_wav("garbage");
    std::fs::write(&path, b"definitely not a RIFF header, just text").unwrap();
    let err = SymphoniaSource::open(&path).err().unwrap();
    std::fs::remove_file(&path).ok();
    assert!(
        matches!(err, ClatterError::UnsupportedFormat(_)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let err = SymphoniaSource::open(&temp_wav("missing")).err().unwrap();
    assert!(matches!(err, ClatterError::Io(_)));
}

#[derive(Default)]
struct Recorder {
    spectrogram_titles: Vec<String>,
    peak_hz: Option<f32>,
    played: Vec<f32>,
    finished: bool,
}

impl Visualizer for Recorder {
    fn show_spectrogram(&mut self, s: &Spectrogram, title: &str) -> Result<()> {
        self.spectrogram_titles.push(title.to_string());
        self.peak_hz = s.peak_frequency();
        Ok(())
    }

    fn show_spectrum(&mut self, _s: &Spectrum, _title: &str) -> Result<()> {
        Ok(())
    }
}

impl AudioSink for Recorder {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.played.extend_from_slice(samples);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[test]
fn session_streams_and_analyses_a_tone() {
    let tone = (0..RATE as usize)
        .map(|i| (2.0 * std::f32::consts::PI * 3_000.0 * i as f32 / RATE as f32).sin());
    let path = write_mono_f32("tone", tone);

    let config = ExtractConfig {
        play: Some(PlayMode::Streamed),
        ..ExtractConfig::default()
    };
    let mut session = Session::new(config, open_source(&path, None).unwrap());
    let mut viz = Recorder::default();
    let mut sink = Recorder::default();

    let window = Window::new(Some(0.25), 0.5).unwrap();
    let clip = session
        .run_window(&window, "Spectrogram", &mut viz, Some(&mut sink))
        .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(clip.samples.len(), 24_000);
    assert_eq!(viz.spectrogram_titles, vec!["Spectrogram".to_string()]);
    // 256-point frames at 48 kHz: 187.5 Hz per bin, 3 kHz sits on bin 16.
    assert_relative_eq!(viz.peak_hz.unwrap(), 3_000.0, epsilon = 1.0);
    assert!(sink.finished);
    assert!(sink.played.len() >= clip.filled);
    assert_eq!(session.stats().windows, 1);
}
