//! The `compare` command: extract both bundles, run the engine, report.

use crate::bundle::{extract::extract_bundle, BundleSnapshot};
use crate::cli::Cli;
use crate::compare;
use crate::report;
use crate::rules;

/// Executes a full comparison run.
///
/// Returns `Ok(true)` when no regressions were found, `Ok(false)` when
/// regressions were detected. Both bundles are extracted into a temporary
/// workspace that is removed on every exit path.
///
/// # Errors
///
/// Returns an error string when an input archive is missing or cannot be
/// extracted, the rules file is malformed, or the report cannot be written.
pub fn run(cli: &Cli) -> Result<bool, String> {
    if !cli.baseline.exists() {
        return Err(format!("baseline bundle not found: {}", cli.baseline.display()));
    }
    if !cli.current.exists() {
        return Err(format!("current bundle not found: {}", cli.current.display()));
    }

    let rules = rules::load(cli.rules.as_deref(), cli.spec_type)?;

    let workspace = tempfile::tempdir()
        .map_err(|e| format!("failed to create extraction workspace: {e}"))?;
    let baseline_dir = workspace.path().join("baseline");
    let current_dir = workspace.path().join("current");

    println!("Extracting baseline bundle to {}...", baseline_dir.display());
    extract_bundle(&cli.baseline, &baseline_dir)?;
    println!("Extracting current bundle to {}...", current_dir.display());
    extract_bundle(&cli.current, &current_dir)?;

    let baseline = BundleSnapshot::from_dir(&baseline_dir)?;
    let current = BundleSnapshot::from_dir(&current_dir)?;
    println!("Baseline files: {}", baseline.files.len());
    println!("Current files: {}", current.files.len());

    let result = compare::compare(&baseline, &current, &rules, cli.spec_type.key());

    if let Some(path) = &cli.report {
        report::write_report(path, &result)?;
        println!("Report written to {}", path.display());
    }

    println!();
    println!("{}", report::format_summary(&result));
    println!();
    if result.passed() {
        println!("No regressions detected");
    } else {
        println!("Regressions detected");
    }

    Ok(result.passed())
}
