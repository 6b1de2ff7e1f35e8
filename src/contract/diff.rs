//! Field Drift Engine
//!
//! Structural comparison of two contracts at the field level.
//! This is the "git diff" for a data contract: what was added, what was
//! removed, and which shared fields changed type or required-ness.

use super::Contract;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Field-level drift between a baseline and a candidate contract
///
/// Absence of a baseline is represented by the caller as `Option<FieldDrift>`
/// being `None`; an all-empty `FieldDrift` means "compared, nothing changed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDrift {
    /// Present in candidate, absent in baseline
    pub added_fields: BTreeSet<String>,
    /// Present in baseline, absent in candidate
    pub removed_fields: BTreeSet<String>,
    /// Shared fields whose `type` differs
    pub type_changes: BTreeSet<String>,
    /// Shared fields whose `required` flag differs
    pub required_changes: BTreeSet<String>,
}

impl FieldDrift {
    /// No differences of any kind
    pub fn is_empty(&self) -> bool {
        self.added_fields.is_empty()
            && self.removed_fields.is_empty()
            && self.type_changes.is_empty()
            && self.required_changes.is_empty()
    }

    /// Removal, type change or required-ness change. Additions never break.
    pub fn has_breaking_changes(&self) -> bool {
        !self.removed_fields.is_empty()
            || !self.type_changes.is_empty()
            || !self.required_changes.is_empty()
    }
}

/// The diff engine that compares contracts
pub struct DriftEngine;

impl DriftEngine {
    /// Compare a baseline contract against a candidate and return all field drift
    pub fn diff(baseline: &Contract, candidate: &Contract) -> FieldDrift {
        let baseline_keys: HashSet<&str> = baseline.fields.keys().map(String::as_str).collect();
        let candidate_keys: HashSet<&str> = candidate.fields.keys().map(String::as_str).collect();

        let mut drift = FieldDrift {
            added_fields: candidate_keys
                .difference(&baseline_keys)
                .map(|name| name.to_string())
                .collect(),
            removed_fields: baseline_keys
                .difference(&candidate_keys)
                .map(|name| name.to_string())
                .collect(),
            ..FieldDrift::default()
        };

        for name in baseline_keys.intersection(&candidate_keys) {
            let (Some(before), Some(after)) = (baseline.fields.get(*name), candidate.fields.get(*name))
            else {
                continue;
            };

            if before.field_type != after.field_type {
                drift.type_changes.insert(name.to_string());
            }
            if before.required != after.required {
                drift.required_changes.insert(name.to_string());
            }
        }

        if drift.is_empty() {
            tracing::debug!("No field drift between baseline and candidate");
            return drift;
        }

        tracing::debug!(
            added = drift.added_fields.len(),
            removed = drift.removed_fields.len(),
            type_changes = drift.type_changes.len(),
            required_changes = drift.required_changes.len(),
            "Field drift computed"
        );

        drift
    }
}
