//! Shared plumbing for the `detector` and `selector` binaries.

pub mod args;
pub mod logging;
pub mod plot;
pub mod runner;
pub mod settings;

use std::process::ExitCode;

/// Print a top-level failure the way both tools report it.
pub fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("error: {err:#}");
    ExitCode::FAILURE
}
