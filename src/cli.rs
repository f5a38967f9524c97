//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::rules::SpecType;

/// Top-level CLI parser for `bundiff`.
#[derive(Debug, Parser)]
#[command(name = "bundiff", version, about = "Compare diagnostic bundles for regressions")]
pub struct Cli {
    /// Path to the baseline bundle (tar.gz).
    #[arg(long)]
    pub baseline: PathBuf,

    /// Path to the current bundle (tar.gz).
    #[arg(long)]
    pub current: PathBuf,

    /// Comparison rules YAML; built-in defaults are used when omitted or missing.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Write the JSON comparison report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Type of bundle being compared; selects the rule set.
    #[arg(long, value_enum)]
    pub spec_type: SpecType,
}
