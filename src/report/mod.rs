//! Report rendering: JSON report file and human-readable summary.

use std::fs;
use std::path::Path;

use crate::compare::ComparisonResult;

/// How many difference records the summary lists before truncating.
const MAX_DIFFERENCES_SHOWN: usize = 10;
/// How many missing files the summary lists before truncating.
const MAX_MISSING_SHOWN: usize = 5;

/// Writes the machine-readable JSON report.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report(path: &Path, result: &ComparisonResult) -> Result<(), String> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| format!("failed to serialize report: {e}"))?;
    fs::write(path, json).map_err(|e| format!("failed to write report {}: {e}", path.display()))
}

/// Formats a comparison result as a human-readable summary.
#[must_use]
pub fn format_summary(result: &ComparisonResult) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Bundle comparison report - {}", result.spec_type));
    lines.push(format!("Files compared:       {}", result.files_compared));
    lines.push(format!("  Exact matches:      {}", result.exact_matches));
    lines.push(format!("  Structural matches: {}", result.structural_matches));
    lines.push(format!("  Non-empty checks:   {}", result.non_empty_checks));
    lines.push(format!("Files different:      {}", result.files_different));
    lines.push(format!("Missing in current:   {}", result.files_missing_in_current));
    lines.push(format!("Missing in baseline:  {}", result.files_missing_in_baseline));

    if !result.differences.is_empty() {
        lines.push(String::new());
        lines.push(format!("Differences ({}):", result.differences.len()));
        for diff in result.differences.iter().take(MAX_DIFFERENCES_SHOWN) {
            lines.push(format!("  - {} [{}]: {}", diff.file, diff.discipline, diff.reason));
        }
        if result.differences.len() > MAX_DIFFERENCES_SHOWN {
            lines.push(format!(
                "  ... and {} more",
                result.differences.len() - MAX_DIFFERENCES_SHOWN
            ));
        }
    }

    if !result.missing_in_current.is_empty() {
        lines.push(String::new());
        lines.push(format!("Missing files ({}):", result.missing_in_current.len()));
        for file in result.missing_in_current.iter().take(MAX_MISSING_SHOWN) {
            lines.push(format!("  - {file}"));
        }
        if result.missing_in_current.len() > MAX_MISSING_SHOWN {
            lines.push(format!(
                "  ... and {} more",
                result.missing_in_current.len() - MAX_MISSING_SHOWN
            ));
        }
    }

    if !result.notes.is_empty() {
        lines.push(String::new());
        lines.push("Informational:".to_string());
        for note in &result.notes {
            lines.push(format!("  - {note}"));
        }
    }

    lines.join("\n")
}
