//! Startup steps shared by both tools: config, source, playback, devices.

use std::path::Path;

use anyhow::Context;
use clatter_core::{
    audio::device::list_output_devices, open_source, ExtractConfig, FrameSource, PlayMode,
    Playback, Session,
};
use tracing::{debug, info};

use crate::{args::CommonArgs, settings::load_settings};

/// Merge the settings file (if any) with the command line.
///
/// `default_mode` is how the tool plays audio when neither the settings
/// file nor the flags say otherwise.
pub fn build_config(common: &CommonArgs, default_mode: PlayMode) -> anyhow::Result<ExtractConfig> {
    let settings = match &common.settings {
        Some(path) => load_settings(path)?,
        None => Default::default(),
    };

    let mut config = settings.extract_config();
    config.play = common.play.then(|| settings.play_mode_or(default_mode));
    config.analyze = !common.no_analyze;
    config.spectrum |= common.spectrum;
    if let Some(device) = &common.device {
        config.output_device = Some(device.clone());
    }
    debug!(?config, "configuration resolved");
    Ok(config)
}

pub fn open_session(
    path: &Path,
    common: &CommonArgs,
    config: ExtractConfig,
) -> anyhow::Result<Session<dyn FrameSource>> {
    let source = open_source(path, common.raw_rate)
        .with_context(|| format!("opening {}", path.display()))?;
    info!(path = %path.display(), sample_rate = source.sample_rate(), "opened audio");
    Ok(Session::new(config, source))
}

/// Open the output device if playback is on. Dropping the result closes it.
pub fn open_playback(
    config: &ExtractConfig,
    source_rate: u32,
) -> anyhow::Result<Option<Playback>> {
    if config.play.is_none() {
        return Ok(None);
    }
    let playback = Playback::open(
        config.output_device.as_deref(),
        config.playback_rate,
        source_rate,
        config.resample_chunk,
    )
    .context("opening audio output")?;
    Ok(Some(playback))
}

pub fn print_devices() {
    let devices = list_output_devices();
    if devices.is_empty() {
        println!("no output devices found");
        return;
    }
    for device in devices {
        let marker = if device.is_default { "*" } else { " " };
        println!("{marker} {}", device.name);
    }
}
