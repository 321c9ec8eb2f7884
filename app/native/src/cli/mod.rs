//! Command-line interface for Fences.
//!
//! Every command loads the fence document, runs against a headless window
//! host, and exits. Mutations go through the same manager operations the
//! desktop shell uses, so migration and persistence behave identically.

mod commands;
mod output;
mod prompt;

use clap::Parser;
pub use commands::Cli;

use crate::error::FencesError;

/// Runs the CLI.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), FencesError> {
    let cli = Cli::parse();
    cli.execute()
}
