//! Walk an annotation file and process every labelled range of a recording.
//!
//! Annotation lines look like `12:30-13:05   door slam`; anything else is
//! ignored. By default the annotations for `path/to/rec.m4a` are read from
//! `audio/rec.txt`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clatter_cli::{args::CommonArgs, logging, plot::viewer_for, report, runner};
use clatter_core::{read_annotations, AudioSink, PlayMode, Window};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Audio file to read
    #[arg(required_unless_present = "list_devices")]
    file: Option<PathBuf>,

    /// Annotation file (default: audio/<file stem>.txt)
    #[arg(long, value_name = "PATH")]
    annotations: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn default_annotation_path(file: &Path) -> PathBuf {
    let stem = file.file_stem().unwrap_or(file.as_os_str());
    Path::new("audio").join(format!("{}.txt", stem.to_string_lossy()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.verbose);

    if cli.common.list_devices {
        runner::print_devices();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let Some(file) = &cli.file else {
        anyhow::bail!("no audio file given");
    };
    let annotation_path = cli
        .annotations
        .clone()
        .unwrap_or_else(|| default_annotation_path(file));
    let annotations = read_annotations(&annotation_path)
        .with_context(|| format!("reading annotations {}", annotation_path.display()))?;
    info!(count = annotations.len(), path = %annotation_path.display(), "annotations loaded");

    let config = runner::build_config(&cli.common, PlayMode::Buffered)?;
    let mut session = runner::open_session(file, &cli.common, config)?;
    let mut playback = runner::open_playback(session.config(), session.sample_rate())?;
    let mut viewer = viewer_for(cli.common.save.as_deref());

    for annotation in &annotations {
        let window = match Window::from_annotation(annotation) {
            Ok(window) => window,
            Err(e) => {
                warn!("skipping annotation: {e}");
                continue;
            }
        };
        let title = format!(
            "Spectrogram {}-{} {}",
            annotation.start, annotation.end, annotation.label
        );
        let audio = playback.as_mut().map(|p| p as &mut dyn AudioSink);
        session.run_window(&window, &title, &mut viewer, audio)?;
    }

    let stats = session.stats();
    info!(
        windows = stats.windows,
        partial = stats.partial_windows,
        samples = stats.samples_collected,
        "all annotations processed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_default_to_audio_dir() {
        assert_eq!(
            default_annotation_path(Path::new("/data/rec-2019.m4a")),
            PathBuf::from("audio/rec-2019.txt")
        );
        assert_eq!(
            default_annotation_path(Path::new("take.1.opus")),
            PathBuf::from("audio/take.1.txt")
        );
    }
}
