//! Comparison rule sets: which discipline applies to which bundle file.
//!
//! Rules are loaded from a YAML file keyed by bundle type, with a
//! `defaults` key as fallback. When no file is available a compiled-in
//! default rule set is used instead.

mod classify;

pub use classify::{classify, pattern_matches, Discipline};

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

/// The type of bundle being compared; selects the rule-set key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpecType {
    /// A preflight check bundle.
    Preflight,
    /// A support bundle.
    Supportbundle,
}

impl SpecType {
    /// The key this bundle type uses in the rules file.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Supportbundle => "supportbundle",
        }
    }
}

/// A named structural comparator, as referenced by rule files.
///
/// Names that no comparator implements are kept as `Unknown` and treated
/// as an automatic pass, so rule files may reference comparators ahead of
/// their implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparatorKind {
    /// Compare only the `isConnected` boolean of a database check.
    DatabaseConnection,
    /// Assert the DNS debug document has a working resolution structure.
    DnsStructure,
    /// Compare the image set and per-image `exists` flags of a registry check.
    RegistryExists,
    /// Compare only the `response.status` code of an HTTP check.
    HttpStatus,
    /// Compare only the major/minor fields of the cluster version.
    ClusterVersion,
    /// Compare the set of analyzers that produced results.
    AnalysisResults,
    /// A comparator name with no implementation; always passes.
    Unknown(String),
}

impl ComparatorKind {
    /// Resolves a comparator name from a rules file. Never fails;
    /// unrecognized names become [`ComparatorKind::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "database_connection" => Self::DatabaseConnection,
            "dns_structure" => Self::DnsStructure,
            "registry_exists" => Self::RegistryExists,
            "http_status" => Self::HttpStatus,
            "cluster_version" => Self::ClusterVersion,
            "analysis_results" => Self::AnalysisResults,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The rules-file name of this comparator.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::DatabaseConnection => "database_connection",
            Self::DnsStructure => "dns_structure",
            Self::RegistryExists => "registry_exists",
            Self::HttpStatus => "http_status",
            Self::ClusterVersion => "cluster_version",
            Self::AnalysisResults => "analysis_results",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The rule set applied to one comparison run.
///
/// Pattern precedence is by tier (exact before structural before the
/// implicit non-empty default); within a tier, first matching pattern wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// Glob patterns for files compared byte-for-byte.
    pub exact_match: Vec<String>,
    /// Glob patterns mapped to structural comparators, in declared order.
    pub structural_compare: Vec<(String, ComparatorKind)>,
}

/// On-disk shape of a single rule set in the YAML rules file.
///
/// `structural_compare` is kept as a YAML mapping so declaration order
/// survives deserialization.
#[derive(Debug, Default, Deserialize)]
struct RawRuleSet {
    #[serde(default)]
    exact_match: Vec<String>,
    #[serde(default)]
    structural_compare: serde_yaml::Mapping,
}

impl RuleSet {
    /// An empty rule set: every file falls through to the non-empty check.
    #[must_use]
    pub fn empty() -> Self {
        Self { exact_match: Vec::new(), structural_compare: Vec::new() }
    }

    /// The compiled-in default rule set, used when no rules file is available.
    #[must_use]
    pub fn default_rules() -> Self {
        let structural = [
            ("postgres/*.json", "database_connection"),
            ("mysql/*.json", "database_connection"),
            ("mssql/*.json", "database_connection"),
            ("redis/*.json", "database_connection"),
            ("dns/debug.json", "dns_structure"),
            ("registry/*.json", "registry_exists"),
            ("http*.json", "http_status"),
            ("cluster-info/cluster_version.json", "cluster_version"),
            ("analysis.json", "analysis_results"),
        ];
        Self {
            exact_match: vec![
                "static-data.txt/static-data".to_string(),
                "version.yaml".to_string(),
            ],
            structural_compare: structural
                .into_iter()
                .map(|(pattern, name)| (pattern.to_string(), ComparatorKind::from_name(name)))
                .collect(),
        }
    }

    fn from_raw(raw: RawRuleSet) -> Result<Self, String> {
        let mut structural_compare = Vec::with_capacity(raw.structural_compare.len());
        for (pattern, comparator) in &raw.structural_compare {
            let (Some(pattern), Some(comparator)) = (pattern.as_str(), comparator.as_str()) else {
                return Err(
                    "structural_compare entries must map pattern strings to comparator names"
                        .to_string(),
                );
            };
            structural_compare
                .push((pattern.to_string(), ComparatorKind::from_name(comparator)));
        }
        Ok(Self { exact_match: raw.exact_match, structural_compare })
    }
}

/// Loads the rule set for a bundle type from a YAML rules file.
///
/// Falls back to [`RuleSet::default_rules`] when `path` is `None` or the
/// file does not exist. When the file parses but contains neither the
/// bundle-type key nor a `defaults` key, an empty rule set is returned
/// (every file gets the non-empty check).
///
/// # Errors
///
/// Returns an error if an existing rules file cannot be read or parsed.
pub fn load(path: Option<&Path>, spec_type: SpecType) -> Result<RuleSet, String> {
    let Some(path) = path else {
        return Ok(RuleSet::default_rules());
    };
    if !path.exists() {
        eprintln!("warning: rules file not found at {}, using built-in defaults", path.display());
        return Ok(RuleSet::default_rules());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read rules file {}: {e}", path.display()))?;
    let mut sets: BTreeMap<String, RawRuleSet> = serde_yaml::from_str(&contents)
        .map_err(|e| format!("failed to parse rules file {}: {e}", path.display()))?;

    let raw = sets
        .remove(spec_type.key())
        .or_else(|| sets.remove("defaults"))
        .unwrap_or_default();
    RuleSet::from_raw(raw)
}
