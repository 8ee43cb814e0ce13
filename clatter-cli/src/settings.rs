//! Optional JSON settings file, layered under the command line flags.

use std::fs;
use std::path::Path;

use anyhow::Context;
use clatter_core::{
    analysis::spectrogram::{DEFAULT_FFT_SIZE, DEFAULT_OVERLAP},
    audio::DEFAULT_PLAYBACK_RATE,
    ExtractConfig, PlayMode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ClatterSettings {
    pub playback_rate: u32,
    pub fft_size: usize,
    pub fft_overlap: usize,
    pub resample_chunk: usize,
    pub output_device: Option<String>,
    /// `"auto"`, `"streamed"` or `"buffered"`. `auto` lets each tool pick.
    pub play_mode: String,
    pub spectrum: bool,
}

impl Default for ClatterSettings {
    fn default() -> Self {
        Self {
            playback_rate: DEFAULT_PLAYBACK_RATE,
            fft_size: DEFAULT_FFT_SIZE,
            fft_overlap: DEFAULT_OVERLAP,
            resample_chunk: 1024,
            output_device: None,
            play_mode: "auto".into(),
            spectrum: false,
        }
    }
}

impl ClatterSettings {
    pub fn normalize(&mut self) {
        self.playback_rate = self.playback_rate.clamp(8_000, 192_000);
        self.fft_size = self.fft_size.clamp(16, 65_536);
        self.fft_overlap = self.fft_overlap.min(self.fft_size - 1);
        self.resample_chunk = self.resample_chunk.clamp(64, 16_384);
        self.play_mode = normalize_play_mode(&self.play_mode);
        self.output_device = self
            .output_device
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
    }

    /// Playback mode to use when playback is on, given the tool's own default.
    pub fn play_mode_or(&self, fallback: PlayMode) -> PlayMode {
        match self.play_mode.as_str() {
            "streamed" => PlayMode::Streamed,
            "buffered" => PlayMode::Buffered,
            _ => fallback,
        }
    }

    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            playback_rate: self.playback_rate,
            resample_chunk: self.resample_chunk,
            output_device: self.output_device.clone(),
            spectrum: self.spectrum,
            fft_size: self.fft_size,
            fft_overlap: self.fft_overlap,
            ..ExtractConfig::default()
        }
    }
}

pub fn normalize_play_mode(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "stream" | "streamed" | "live" => "streamed".into(),
        "buffer" | "buffered" | "after" => "buffered".into(),
        _ => "auto".into(),
    }
}

pub fn parse_settings(raw: &str) -> anyhow::Result<ClatterSettings> {
    let mut settings: ClatterSettings = serde_json::from_str(raw)?;
    settings.normalize();
    Ok(settings)
}

pub fn load_settings(path: &Path) -> anyhow::Result<ClatterSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    parse_settings(&raw).with_context(|| format!("parsing settings file {}", path.display()))
}
