//! Neighbor-link symmetry validation.
//!
//! Links are intended to be symmetric, but the boundary between the
//! managed numbered-line files and externally sourced branch-line files
//! is known to be imperfect, so asymmetry is reported rather than
//! repaired. References leaving the managed id set are skipped entirely.

use std::collections::HashMap;

use serde_json::Value;

/// The managed grouping files: the core numbered Seoul lines.
pub const MANAGED_LINE_FILES: &[&str] = &[
    "line1.json",
    "line2.json",
    "line3.json",
    "line4.json",
    "line5.json",
    "line6.json",
    "line7.json",
    "line8.json",
    "line9.json",
];

/// Outcome of a validation pass. Errors block deployment; warnings do not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate raw graph nodes: a malformed `neighbors` field is an error;
/// an asymmetric link within the managed set is a warning.
pub fn validate(nodes: &HashMap<String, Value>) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut ids: Vec<&String> = nodes.keys().collect();
    ids.sort();

    for id in ids {
        let Some(neighbors) = nodes[id].get("neighbors").and_then(Value::as_array) else {
            report.errors.push(format!("{id}: neighbors is not an array"));
            continue;
        };

        for neighbor_id in neighbors {
            let Some(neighbor_id) = neighbor_id.as_str() else {
                report
                    .errors
                    .push(format!("{id}: neighbors entry is not a string"));
                continue;
            };

            // References into unmanaged (external) files are not checked.
            let Some(neighbor) = nodes.get(neighbor_id) else {
                continue;
            };

            let lists_back = neighbor
                .get("neighbors")
                .and_then(Value::as_array)
                .map(|list| list.iter().any(|v| v.as_str() == Some(id.as_str())))
                .unwrap_or(false);

            if !lists_back {
                report
                    .warnings
                    .push(format!("{id}: asymmetric link -> {neighbor_id}"));
            }
        }
    }

    report
}
