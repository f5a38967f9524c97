//! Result types for a comparison run.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::rules::ComparatorKind;

/// The outcome of comparing one pair of files.
///
/// Exactly one verdict is produced per common file. Decode and I/O
/// failures are ordinary `ComparisonError` values rather than control
/// flow, so a single bad file never aborts the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Byte-for-byte identical.
    ExactMatch,
    /// The structural comparator found no meaningful difference.
    StructuralMatch {
        /// The comparator that was applied.
        comparator: ComparatorKind,
        /// Informational observations that do not fail the comparison.
        notes: Vec<String>,
    },
    /// The file passed the non-empty check.
    NonEmptyOk,
    /// A meaningful difference was found.
    Different {
        /// The discipline that produced the difference.
        discipline: DiffDiscipline,
        /// Human-readable description of the difference.
        reason: String,
    },
    /// The comparison itself failed (decode error, unreadable file).
    ComparisonError(String),
}

/// The discipline recorded on a difference record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffDiscipline {
    /// Byte-for-byte comparison.
    Exact,
    /// Structural JSON comparison.
    Structural,
    /// Non-empty validation.
    NonEmpty,
    /// The comparison could not be carried out.
    Error,
}

impl std::fmt::Display for DiffDiscipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::Structural => "structural",
            Self::NonEmpty => "non_empty",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A single recorded difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    /// Relative path of the differing file.
    pub file: String,
    /// The discipline under which the difference was found.
    pub discipline: DiffDiscipline,
    /// Human-readable description of the difference.
    pub reason: String,
}

/// Aggregate result of one comparison run.
///
/// Built by the engine during its single pass and returned by value;
/// the renderer and report writer only ever see it immutably.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// The bundle type key this run compared.
    pub spec_type: String,
    /// When the comparison ran.
    pub generated_at: DateTime<Utc>,
    /// Number of common files compared.
    pub files_compared: usize,
    /// Files that matched byte-for-byte.
    pub exact_matches: usize,
    /// Files whose structural comparator passed.
    pub structural_matches: usize,
    /// Files that passed the non-empty check.
    pub non_empty_checks: usize,
    /// Files with a recorded difference (including comparison errors).
    pub files_different: usize,
    /// Baseline files absent from the current bundle (regressions).
    pub files_missing_in_current: usize,
    /// Current files absent from the baseline (informational).
    pub files_missing_in_baseline: usize,
    /// Ordered difference records.
    pub differences: Vec<DiffRecord>,
    /// Relative paths missing from the current bundle.
    pub missing_in_current: Vec<String>,
    /// Relative paths new in the current bundle.
    pub missing_in_baseline: Vec<String>,
    /// Informational observations from passing comparators.
    pub notes: Vec<String>,
}

impl ComparisonResult {
    /// Creates an empty result for the given bundle type.
    #[must_use]
    pub fn new(spec_type: &str) -> Self {
        Self {
            spec_type: spec_type.to_string(),
            generated_at: Utc::now(),
            files_compared: 0,
            exact_matches: 0,
            structural_matches: 0,
            non_empty_checks: 0,
            files_different: 0,
            files_missing_in_current: 0,
            files_missing_in_baseline: 0,
            differences: Vec::new(),
            missing_in_current: Vec::new(),
            missing_in_baseline: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Folds one file's verdict into the aggregate.
    pub fn record(&mut self, file: &Path, verdict: Verdict) {
        self.files_compared += 1;
        match verdict {
            Verdict::ExactMatch => self.exact_matches += 1,
            Verdict::StructuralMatch { notes, .. } => {
                self.structural_matches += 1;
                let file = file.display();
                self.notes.extend(notes.into_iter().map(|note| format!("{file}: {note}")));
            }
            Verdict::NonEmptyOk => self.non_empty_checks += 1,
            Verdict::Different { discipline, reason } => self.record_diff(file, discipline, reason),
            Verdict::ComparisonError(reason) => {
                self.record_diff(file, DiffDiscipline::Error, format!("comparison error: {reason}"));
            }
        }
    }

    /// Records a baseline file that is absent from the current bundle.
    pub fn record_missing_in_current(&mut self, file: &Path) {
        self.files_missing_in_current += 1;
        self.missing_in_current.push(file.display().to_string());
    }

    /// Records a file that is new in the current bundle.
    pub fn record_missing_in_baseline(&mut self, file: &Path) {
        self.files_missing_in_baseline += 1;
        self.missing_in_baseline.push(file.display().to_string());
    }

    /// `true` when the run found no regressions: no differences and no
    /// missing-in-current files. New files in the current bundle never
    /// affect the outcome.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.differences.is_empty() && self.missing_in_current.is_empty()
    }

    fn record_diff(&mut self, file: &Path, discipline: DiffDiscipline, reason: String) {
        self.files_different += 1;
        self.differences.push(DiffRecord {
            file: file.display().to_string(),
            discipline,
            reason,
        });
    }
}
