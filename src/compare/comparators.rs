//! Structural comparators: per-family equivalence over parsed JSON.
//!
//! Each comparator encodes which fields of a semi-structured diagnostic
//! file matter for regression purposes. Inputs are already-decoded JSON
//! documents; decode failures are handled before dispatch.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::rules::ComparatorKind;

/// The outcome of one structural comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The documents are equivalent; `notes` carries informational
    /// observations that do not fail the comparison.
    Pass {
        /// Informational observations (may be empty).
        notes: Vec<String>,
    },
    /// A meaningful difference was found.
    Fail {
        /// Human-readable description of the difference.
        reason: String,
    },
}

impl Outcome {
    fn pass() -> Self {
        Self::Pass { notes: Vec::new() }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self::Fail { reason: reason.into() }
    }
}

/// Dispatches to the comparator named by `kind`.
///
/// An [`ComparatorKind::Unknown`] comparator passes automatically so rule
/// files may reference comparators that are not implemented yet.
#[must_use]
pub fn apply(kind: &ComparatorKind, baseline: &Value, current: &Value) -> Outcome {
    match kind {
        ComparatorKind::DatabaseConnection => database_connection(baseline, current),
        ComparatorKind::DnsStructure => dns_structure(current),
        ComparatorKind::RegistryExists => registry_exists(baseline, current),
        ComparatorKind::HttpStatus => http_status(baseline, current),
        ComparatorKind::ClusterVersion => cluster_version(baseline, current),
        ComparatorKind::AnalysisResults => analysis_results(baseline, current),
        ComparatorKind::Unknown(_) => Outcome::pass(),
    }
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Only the binary up/down signal matters; latency and error details vary
/// run to run.
fn database_connection(baseline: &Value, current: &Value) -> Outcome {
    let was_connected = bool_field(baseline, "isConnected");
    let is_connected = bool_field(current, "isConnected");
    if was_connected == is_connected {
        Outcome::pass()
    } else {
        Outcome::fail(format!(
            "database connection status changed: {was_connected} -> {is_connected}"
        ))
    }
}

/// Checks resolution structure on the current document only: addresses and
/// pod lists vary, so existence is asserted rather than equality.
fn dns_structure(current: &Value) -> Outcome {
    let Some(kubernetes) = current.get("query").and_then(|q| q.get("kubernetes")) else {
        return Outcome::fail("query.kubernetes missing");
    };
    if kubernetes.get("address").and_then(Value::as_str).unwrap_or("").is_empty() {
        return Outcome::fail("kubernetes address is empty");
    }
    if current.get("kubeDNSService").and_then(Value::as_str).unwrap_or("").is_empty() {
        return Outcome::fail("kubeDNSService is empty");
    }
    if current.get("kubeDNSPods").and_then(Value::as_array).map_or(true, Vec::is_empty) {
        return Outcome::fail("kubeDNSPods is empty");
    }
    let non_resolvable = current
        .get("query")
        .and_then(|q| q.get("nonResolvableDomain"))
        .and_then(|d| d.get("address"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if !non_resolvable.is_empty() {
        return Outcome::fail("nonResolvableDomain resolved but should not");
    }
    Outcome::pass()
}

fn image_names(value: &Value) -> BTreeSet<String> {
    value
        .get("images")
        .and_then(Value::as_object)
        .map(|images| images.keys().cloned().collect())
        .unwrap_or_default()
}

/// The image set must be identical and each shared image's `exists` flag
/// unchanged; digests and timing fields are ignored.
fn registry_exists(baseline: &Value, current: &Value) -> Outcome {
    let baseline_names = image_names(baseline);
    let current_names = image_names(current);
    if baseline_names != current_names {
        return Outcome::fail(format!(
            "registry image list changed: baseline {baseline_names:?}, current {current_names:?}"
        ));
    }

    let empty = serde_json::Map::new();
    let baseline_images = baseline.get("images").and_then(Value::as_object).unwrap_or(&empty);
    let current_images = current.get("images").and_then(Value::as_object).unwrap_or(&empty);
    for name in &baseline_names {
        let was = baseline_images.get(name).is_some_and(|img| bool_field(img, "exists"));
        let is = current_images.get(name).is_some_and(|img| bool_field(img, "exists"));
        if was != is {
            return Outcome::fail(format!("registry image '{name}' existence changed: {was} -> {is}"));
        }
    }
    Outcome::pass()
}

fn status_code(value: &Value) -> i64 {
    value
        .get("response")
        .and_then(|r| r.get("status"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

fn http_status(baseline: &Value, current: &Value) -> Outcome {
    let was = status_code(baseline);
    let is = status_code(current);
    if was == is {
        Outcome::pass()
    } else {
        Outcome::fail(format!("HTTP status changed: {was} -> {is}"))
    }
}

/// Only major/minor matter; build metadata, VCS hash and toolchain version
/// change with every cluster update.
fn cluster_version(baseline: &Value, current: &Value) -> Outcome {
    let baseline_info = baseline.get("info");
    let current_info = current.get("info");
    for field in ["major", "minor"] {
        let was = baseline_info.and_then(|i| i.get(field));
        let is = current_info.and_then(|i| i.get(field));
        if was != is {
            return Outcome::fail(format!(
                "cluster {field} version changed: {} -> {}",
                was.unwrap_or(&Value::Null),
                is.unwrap_or(&Value::Null),
            ));
        }
    }
    Outcome::pass()
}

fn severity_map(items: &[Value]) -> BTreeMap<String, Option<String>> {
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let severity = item.get("severity").and_then(Value::as_str).map(String::from);
            Some((name.to_string(), severity))
        })
        .collect()
}

fn is_significant(severity: Option<&str>) -> bool {
    matches!(severity, Some("error" | "warn"))
}

/// The set of analyzers that ran must be identical. Severity changes are
/// reported as informational notes but do not fail the comparison.
fn analysis_results(baseline: &Value, current: &Value) -> Outcome {
    let (Some(baseline_items), Some(current_items)) = (baseline.as_array(), current.as_array())
    else {
        return Outcome::fail("expected a list of analyzer results");
    };

    let baseline_results = severity_map(baseline_items);
    let current_results = severity_map(current_items);

    let baseline_names: BTreeSet<&String> = baseline_results.keys().collect();
    let current_names: BTreeSet<&String> = current_results.keys().collect();
    if baseline_names != current_names {
        let dropped: Vec<&str> =
            baseline_names.difference(&current_names).map(|n| n.as_str()).collect();
        let added: Vec<&str> =
            current_names.difference(&baseline_names).map(|n| n.as_str()).collect();
        let mut parts = Vec::new();
        if !dropped.is_empty() {
            parts.push(format!("dropped analyzers: {}", dropped.join(", ")));
        }
        if !added.is_empty() {
            parts.push(format!("new analyzers: {}", added.join(", ")));
        }
        return Outcome::fail(format!("analyzer set changed ({})", parts.join("; ")));
    }

    let mut notes = Vec::new();
    for (name, was) in &baseline_results {
        let is = &current_results[name];
        if was != is && (is_significant(was.as_deref()) || is_significant(is.as_deref())) {
            notes.push(format!(
                "analyzer '{name}' severity changed: {} -> {}",
                was.as_deref().unwrap_or("none"),
                is.as_deref().unwrap_or("none"),
            ));
        }
    }
    Outcome::Pass { notes }
}
