//! Core library entry for the `bundiff` CLI.
//!
//! Compares two diagnostic bundle archives (a baseline and a current run)
//! using a tiered rule set: byte-exact matching for deterministic files,
//! structural comparators for semi-deterministic JSON files, and a
//! non-empty check for everything else.

pub mod bundle;
pub mod cli;
pub mod commands;
pub mod compare;
pub mod report;
pub mod rules;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// Returns `Ok(true)` when the comparison found no regressions and
/// `Ok(false)` when regressions were detected.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, an input archive
/// is missing, or the comparison cannot be set up at all.
pub fn run<I, T>(args: I) -> Result<bool, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::compare::run(&cli)
}
