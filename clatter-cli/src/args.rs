//! Command line flags shared by `detector` and `selector`.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args};
use clatter_core::{parse_time, TimeSpec, Window};

#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Play the extracted audio
    #[arg(short, long)]
    pub play: bool,

    /// Do not analyze the extracted audio
    #[arg(short = 'n', long = "no-analyze")]
    pub no_analyze: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also plot the FFT magnitude of the whole window
    #[arg(long)]
    pub spectrum: bool,

    /// Write plots as PNG files into DIR instead of opening a window
    #[arg(long, value_name = "DIR")]
    pub save: Option<PathBuf>,

    /// Output device to play on (defaults to the system default)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Treat FILE as headerless little-endian f32 mono at HZ
    #[arg(long, value_name = "HZ")]
    pub raw_rate: Option<u32>,
}

/// A time flag that could not be turned into a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagError(pub String);

impl FlagError {
    /// Print the message and give the exit status the tools use for it.
    pub fn report(&self) -> ExitCode {
        eprintln!("{self}");
        ExitCode::FAILURE
    }
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse the value of `--<flag>` as a time.
pub fn parse_time_flag(flag: &str, raw: &str) -> Result<TimeSpec, FlagError> {
    parse_time(raw).map_err(|e| FlagError(format!("Could not parse --{flag} argument: {e}")))
}

/// Build the extraction window from raw `--begin` / `--duration` values.
pub fn window_from_flags(begin: Option<&str>, duration: &str) -> Result<Window, FlagError> {
    let begin = begin.map(|b| parse_time_flag("begin", b)).transpose()?;
    let duration = parse_time_flag("duration", duration)?;
    Window::from_times(begin.as_ref(), &duration)
        .map_err(|e| FlagError(format!("Could not parse --duration argument: {e}")))
}
