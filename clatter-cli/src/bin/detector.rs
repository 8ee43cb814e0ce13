//! Extract one window of an audio file, show its spectrogram and/or play it.
//!
//! ```text
//! detector recording.m4a --begin 12m30s --duration 2s --play
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clatter_cli::{
    args::{window_from_flags, CommonArgs},
    logging,
    plot::viewer_for,
    report, runner,
};
use clatter_core::{AudioSink, PlayMode, Window};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Audio file to read
    #[arg(required_unless_present = "list_devices")]
    file: Option<PathBuf>,

    /// Where to start, e.g. "30m11s", "28s", "4m300ms90090t"
    #[arg(short, long, value_name = "TIME")]
    begin: Option<String>,

    /// How much to extract
    #[arg(short, long, value_name = "TIME", default_value = "1s")]
    duration: String,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.verbose);

    if cli.common.list_devices {
        runner::print_devices();
        return ExitCode::SUCCESS;
    }

    let window = match window_from_flags(cli.begin.as_deref(), &cli.duration) {
        Ok(window) => window,
        Err(e) => return e.report(),
    };
    info!(start = ?window.start, duration = window.duration, "window parsed");

    match run(&cli, &window) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn run(cli: &Cli, window: &Window) -> anyhow::Result<()> {
    let Some(file) = &cli.file else {
        anyhow::bail!("no audio file given");
    };

    let config = runner::build_config(&cli.common, PlayMode::Streamed)?;
    let mut session = runner::open_session(file, &cli.common, config)?;
    let mut playback = runner::open_playback(session.config(), session.sample_rate())?;
    let mut viewer = viewer_for(cli.common.save.as_deref());

    let audio = playback.as_mut().map(|p| p as &mut dyn AudioSink);
    let clip = session.run_window(window, "Spectrogram", &mut viewer, audio)?;

    info!(
        samples = clip.samples.len(),
        filled = clip.filled,
        seconds = clip.duration_secs(),
        "done"
    );
    Ok(())
}
