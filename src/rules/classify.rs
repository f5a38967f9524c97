//! Pattern classifier: selects the comparison discipline for a file path.

use std::path::Path;

use glob::Pattern;

use super::{ComparatorKind, RuleSet};

/// The comparison discipline selected for a file.
#[derive(Debug, Clone, PartialEq)]
pub enum Discipline {
    /// Byte-for-byte content equality.
    Exact,
    /// Structural JSON comparison with the named comparator.
    Structural(ComparatorKind),
    /// The file must be present and non-empty (and valid JSON when `.json`).
    NonEmpty,
}

/// Tests a relative path against a shell-style glob pattern.
///
/// Literal string equality is also accepted, and an invalid pattern never
/// matches rather than erroring. Default match options are used, so `*`
/// may span path separators (`*-previous.log` matches
/// `pod-logs/app-previous.log`).
#[must_use]
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern == path {
        return true;
    }
    Pattern::new(pattern).is_ok_and(|p| p.matches(path))
}

/// Determines the comparison discipline for a relative bundle path.
///
/// Exact-match patterns take precedence over structural patterns; within
/// each tier the first matching pattern wins. Unmatched paths fall through
/// to the non-empty check so unknown file types are still validated.
#[must_use]
pub fn classify(path: &Path, rules: &RuleSet) -> Discipline {
    let rel = path.to_string_lossy().replace('\\', "/");

    for pattern in &rules.exact_match {
        if pattern_matches(pattern, &rel) {
            return Discipline::Exact;
        }
    }

    for (pattern, comparator) in &rules.structural_compare {
        if pattern_matches(pattern, &rel) {
            return Discipline::Structural(comparator.clone());
        }
    }

    Discipline::NonEmpty
}
