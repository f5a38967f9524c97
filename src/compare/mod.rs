//! The comparison engine: one sequential pass over two bundle snapshots.

pub mod comparators;
pub mod result;

pub use result::{ComparisonResult, DiffDiscipline, DiffRecord, Verdict};

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::bundle::BundleSnapshot;
use crate::rules::{classify, pattern_matches, ComparatorKind, Discipline, RuleSet};

use comparators::Outcome;

/// Files that legitimately exist in only one bundle. Previous-container
/// logs are only written after a restart, so their absence is not a
/// regression in either direction.
const OPTIONAL_PATTERNS: &[&str] = &["*-previous.log"];

/// Returns `true` for files whose absence is acceptable.
fn is_optional(path: &Path) -> bool {
    let rel = path.to_string_lossy().replace('\\', "/");
    OPTIONAL_PATTERNS.iter().any(|pattern| pattern_matches(pattern, &rel))
}

/// Compares two extracted bundles under the given rule set.
///
/// Missing files are checked first (in both directions, honoring the
/// optional-file allowlist), then every common file is classified and
/// compared in lexicographic path order. Each file gets exactly one
/// verdict; per-file failures degrade that file only and never abort
/// the pass.
#[must_use]
pub fn compare(
    baseline: &BundleSnapshot,
    current: &BundleSnapshot,
    rules: &RuleSet,
    spec_type: &str,
) -> ComparisonResult {
    let mut result = ComparisonResult::new(spec_type);

    for rel in baseline.files.difference(&current.files) {
        if !is_optional(rel) {
            result.record_missing_in_current(rel);
        }
    }
    for rel in current.files.difference(&baseline.files) {
        if !is_optional(rel) {
            result.record_missing_in_baseline(rel);
        }
    }

    for rel in baseline.files.intersection(&current.files) {
        let verdict =
            compare_file(&baseline.file_path(rel), &current.file_path(rel), rel, rules);
        result.record(rel, verdict);
    }

    result
}

/// Computes the verdict for one common file.
fn compare_file(
    baseline_path: &Path,
    current_path: &Path,
    rel: &Path,
    rules: &RuleSet,
) -> Verdict {
    match classify(rel, rules) {
        Discipline::Exact => compare_exact(baseline_path, current_path),
        Discipline::Structural(comparator) => {
            compare_structural(baseline_path, current_path, comparator)
        }
        Discipline::NonEmpty => check_non_empty(current_path),
    }
}

fn compare_exact(baseline_path: &Path, current_path: &Path) -> Verdict {
    let baseline = match fs::read(baseline_path) {
        Ok(bytes) => bytes,
        Err(e) => return Verdict::ComparisonError(format!("failed to read baseline file: {e}")),
    };
    let current = match fs::read(current_path) {
        Ok(bytes) => bytes,
        Err(e) => return Verdict::ComparisonError(format!("failed to read current file: {e}")),
    };
    if baseline == current {
        Verdict::ExactMatch
    } else {
        Verdict::Different {
            discipline: DiffDiscipline::Exact,
            reason: "content mismatch".to_string(),
        }
    }
}

fn compare_structural(
    baseline_path: &Path,
    current_path: &Path,
    comparator: ComparatorKind,
) -> Verdict {
    let baseline = match read_json(baseline_path, "baseline") {
        Ok(value) => value,
        Err(e) => return Verdict::ComparisonError(e),
    };
    let current = match read_json(current_path, "current") {
        Ok(value) => value,
        Err(e) => return Verdict::ComparisonError(e),
    };

    match comparators::apply(&comparator, &baseline, &current) {
        Outcome::Pass { notes } => Verdict::StructuralMatch { comparator, notes },
        Outcome::Fail { reason } => Verdict::Different {
            discipline: DiffDiscipline::Structural,
            reason: format!("{comparator}: {reason}"),
        },
    }
}

fn read_json(path: &Path, side: &str) -> Result<Value, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("failed to read {side} file: {e}"))?;
    serde_json::from_str(&contents).map_err(|e| format!("invalid JSON in {side} file: {e}"))
}

/// The file must have non-zero size; files with a `.json` extension must
/// additionally parse as JSON. Only the current side is checked.
fn check_non_empty(current_path: &Path) -> Verdict {
    let metadata = match fs::metadata(current_path) {
        Ok(metadata) => metadata,
        Err(e) => return Verdict::ComparisonError(format!("failed to stat current file: {e}")),
    };
    if metadata.len() == 0 {
        return Verdict::Different {
            discipline: DiffDiscipline::NonEmpty,
            reason: "file is empty".to_string(),
        };
    }

    if current_path.extension().is_some_and(|ext| ext == "json") {
        if let Err(e) = read_json(current_path, "current") {
            return Verdict::Different { discipline: DiffDiscipline::NonEmpty, reason: e };
        }
    }

    Verdict::NonEmptyOk
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn snapshot(root: &Path) -> BundleSnapshot {
        BundleSnapshot::from_dir(root).unwrap()
    }

    struct BundlePair {
        _workspace: tempfile::TempDir,
        baseline: PathBuf,
        current: PathBuf,
    }

    fn bundle_pair(files: &[(&str, &str, &str)]) -> BundlePair {
        let workspace = tempfile::tempdir().unwrap();
        let baseline = workspace.path().join("baseline");
        let current = workspace.path().join("current");
        for (rel, baseline_contents, current_contents) in files {
            write_file(&baseline, rel, baseline_contents);
            write_file(&current, rel, current_contents);
        }
        BundlePair { _workspace: workspace, baseline, current }
    }

    #[test]
    fn identical_bundles_pass_under_default_rules() {
        let pair = bundle_pair(&[
            ("version.yaml", "v: 1", "v: 1"),
            ("postgres/check.json", r#"{"isConnected": true}"#, r#"{"isConnected": true}"#),
            ("pod-logs/app.log", "line one", "line one"),
        ]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(result.passed());
        assert_eq!(result.files_compared, 3);
        assert_eq!(result.exact_matches, 1);
        assert_eq!(result.structural_matches, 1);
        assert_eq!(result.non_empty_checks, 1);
    }

    const HEALTHY_DNS: &str = r#"{"query": {"kubernetes": {"address": "10.0.0.1"}, "nonResolvableDomain": {}}, "kubeDNSService": "kube-dns", "kubeDNSPods": ["coredns-0"]}"#;

    #[test]
    fn self_comparison_is_clean_under_any_rule_set() {
        let pair = bundle_pair(&[
            ("version.yaml", "v: 1", "v: 1"),
            ("dns/debug.json", HEALTHY_DNS, HEALTHY_DNS),
        ]);
        for rules in [RuleSet::empty(), RuleSet::default_rules()] {
            let result = compare(
                &snapshot(&pair.baseline),
                &snapshot(&pair.current),
                &rules,
                "preflight",
            );
            assert_eq!(result.files_different, 0);
            assert_eq!(result.files_missing_in_current, 0);
            assert_eq!(result.files_missing_in_baseline, 0);
        }
    }

    #[test]
    fn exact_discipline_is_byte_sensitive() {
        let pair = bundle_pair(&[("version.yaml", "version: 1.0", "version: 1.1")]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(!result.passed());
        assert_eq!(result.differences[0].discipline, DiffDiscipline::Exact);
        assert_eq!(result.differences[0].reason, "content mismatch");
    }

    #[test]
    fn structural_mismatch_carries_comparator_reason() {
        let pair = bundle_pair(&[(
            "postgres/check.json",
            r#"{"isConnected": true, "latencyMs": 2}"#,
            r#"{"isConnected": false, "error": "refused"}"#,
        )]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(!result.passed());
        assert_eq!(result.differences[0].discipline, DiffDiscipline::Structural);
        assert!(result.differences[0].reason.contains("database_connection"));
        assert!(result.differences[0].reason.contains("true -> false"));
    }

    #[test]
    fn structural_divergence_in_ignored_fields_passes() {
        let pair = bundle_pair(&[(
            "http-check.json",
            r#"{"response": {"status": 200, "body": "abc"}}"#,
            r#"{"response": {"status": 200, "body": "entirely different"}}"#,
        )]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(result.passed());
    }

    #[test]
    fn invalid_json_under_structural_rule_is_a_comparison_error() {
        let pair =
            bundle_pair(&[("dns/debug.json", "{not json", r#"{"query": {}}"#)]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(!result.passed());
        assert_eq!(result.differences[0].discipline, DiffDiscipline::Error);
        assert!(result.differences[0].reason.contains("invalid JSON"));
    }

    #[test]
    fn empty_file_fails_non_empty_check() {
        let pair = bundle_pair(&[("cluster-resources/nodes.txt", "node-1", "")]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(!result.passed());
        assert_eq!(result.differences[0].discipline, DiffDiscipline::NonEmpty);
        assert_eq!(result.differences[0].reason, "file is empty");
    }

    #[test]
    fn unclassified_json_must_still_parse() {
        let pair = bundle_pair(&[("cluster-resources/pods.json", "{}", "{broken")]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(!result.passed());
        assert_eq!(result.differences[0].discipline, DiffDiscipline::NonEmpty);
    }

    #[test]
    fn missing_optional_file_is_not_a_regression() {
        let pair = bundle_pair(&[("pod-logs/app.log", "line", "line")]);
        write_file(&pair.baseline, "pod-logs/app-previous.log", "old restart log");
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(result.passed());
        assert_eq!(result.files_missing_in_current, 0);
    }

    #[test]
    fn new_optional_file_is_not_recorded_either() {
        let pair = bundle_pair(&[("pod-logs/app.log", "line", "line")]);
        write_file(&pair.current, "pod-logs/app-previous.log", "restarted since baseline");
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(result.passed());
        assert_eq!(result.files_missing_in_baseline, 0);
    }

    #[test]
    fn missing_required_file_fails_the_run() {
        let pair = bundle_pair(&[("version.yaml", "v: 1", "v: 1")]);
        write_file(&pair.baseline, "dns/debug.json", "{}");
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(!result.passed());
        assert_eq!(result.missing_in_current, vec!["dns/debug.json"]);
    }

    #[test]
    fn new_file_in_current_is_informational_only() {
        let pair = bundle_pair(&[("version.yaml", "v: 1", "v: 1")]);
        write_file(&pair.current, "extra/new-collector.json", "{}");
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(result.passed());
        assert_eq!(result.missing_in_baseline, vec!["extra/new-collector.json"]);
    }

    #[test]
    fn differences_are_reported_in_path_order() {
        let pair = bundle_pair(&[
            ("b-file.yaml", "1", "1"),
            ("version.yaml", "old", "new"),
            ("a-dir/static-data.txt", "x", "x"),
        ]);
        write_file(&pair.baseline, "static-data.txt/static-data", "seed");
        write_file(&pair.current, "static-data.txt/static-data", "changed seed");
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        let files: Vec<&str> = result.differences.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(files, vec!["static-data.txt/static-data", "version.yaml"]);
    }

    #[test]
    fn severity_notes_surface_on_the_result() {
        let pair = bundle_pair(&[(
            "analysis.json",
            r#"[{"name": "disk-usage", "severity": "warn"}]"#,
            r#"[{"name": "disk-usage", "severity": "error"}]"#,
        )]);
        let result = compare(
            &snapshot(&pair.baseline),
            &snapshot(&pair.current),
            &RuleSet::default_rules(),
            "preflight",
        );
        assert!(result.passed());
        assert_eq!(result.notes.len(), 1);
        assert!(result.notes[0].contains("warn -> error"));
    }
}
