//! Decision Orchestrator
//!
//! Sequences the version comparator, the policy table and the drift engine
//! into a single governance decision, then feeds that decision through the
//! impact classifier and the CI/CD gate.
//!
//! Precedence, first match wins:
//! 1. policy denies the comparison       -> HARD_FAIL
//! 2. comparison is EQUAL                -> PASS
//! 3. mode is override                   -> SOFT_PASS_DRIFT
//! 4. otherwise                          -> PASS_WITH_FORWARD_COMPAT
//!
//! Breaking field drift (removal, type change, required change) then replaces
//! whatever label 1-4 produced with FIELD_BREAKING_CHANGE and forces the
//! evaluation to not-allowed. Added fields alone never trigger this.
//!
//! Once the label is PASS the drift report is kept for the audit record but is
//! not handed to the impact classifier.

use super::gate::{CicdGate, GateVerdict};
use super::impact::{ImpactAssessment, ImpactClassifier};
use super::policy::{CompatibilityMode, CompatibilityPolicy, Enforcement};
use crate::contract::{version, ComparisonResult, Contract, DriftEngine, FieldDrift};
use crate::error::GovernanceResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// The single governance label produced per evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionLabel {
    Pass,
    PassWithForwardCompat,
    SoftPassDrift,
    HardFail,
    FieldBreakingChange,
}

impl DecisionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionLabel::Pass => "PASS",
            DecisionLabel::PassWithForwardCompat => "PASS_WITH_FORWARD_COMPAT",
            DecisionLabel::SoftPassDrift => "SOFT_PASS_DRIFT",
            DecisionLabel::HardFail => "HARD_FAIL",
            DecisionLabel::FieldBreakingChange => "FIELD_BREAKING_CHANGE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DecisionLabel::FieldBreakingChange | DecisionLabel::HardFail => Severity::Critical,
            DecisionLabel::SoftPassDrift => Severity::Warning,
            DecisionLabel::PassWithForwardCompat | DecisionLabel::Pass => Severity::Info,
        }
    }

    /// Anything but a plain PASS counts as drift
    pub fn drift_detected(&self) -> bool {
        *self != DecisionLabel::Pass
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of the final decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// Label and allow flag after precedence and the breaking-drift override
pub fn decide(
    comparison: ComparisonResult,
    mode: CompatibilityMode,
    allowed: bool,
    field_drift: Option<&FieldDrift>,
) -> (DecisionLabel, bool) {
    let label = if !allowed {
        DecisionLabel::HardFail
    } else if comparison == ComparisonResult::Equal {
        DecisionLabel::Pass
    } else if mode == CompatibilityMode::Override {
        DecisionLabel::SoftPassDrift
    } else {
        DecisionLabel::PassWithForwardCompat
    };

    match field_drift {
        Some(drift) if drift.has_breaking_changes() => (DecisionLabel::FieldBreakingChange, false),
        _ => (label, allowed),
    }
}

/// Everything one evaluation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub comparison: ComparisonResult,
    pub allowed: bool,
    pub decision: DecisionLabel,
    pub severity: Severity,
    pub drift_detected: bool,
    /// `None` when no baseline was supplied (drift unknown, not zero)
    pub field_drift: Option<FieldDrift>,
    pub impact: ImpactAssessment,
    pub gate: GateVerdict,
    pub enforcement: Enforcement,
}

/// The governance engine, bound to one explicit policy
#[derive(Debug, Clone)]
pub struct GovernanceEngine {
    policy: CompatibilityPolicy,
}

impl GovernanceEngine {
    pub fn new(policy: CompatibilityPolicy) -> Self {
        Self { policy }
    }

    /// Evaluate a candidate contract, optionally against a baseline
    pub fn evaluate(
        &self,
        candidate: &Contract,
        baseline: Option<&Contract>,
    ) -> GovernanceResult<Evaluation> {
        let comparison =
            version::compare(&candidate.version, &self.policy.expected_version.to_string())?;
        let policy_allowed = self.policy.mode.allows(comparison);

        info!(
            "Version comparison: contract {} vs expected {} -> {}",
            candidate.version,
            self.policy.expected_version,
            comparison.report_label()
        );

        let field_drift = baseline.map(|base| DriftEngine::diff(base, candidate));
        let (decision, allowed) =
            decide(comparison, self.policy.mode, policy_allowed, field_drift.as_ref());

        if decision == DecisionLabel::FieldBreakingChange && policy_allowed {
            warn!("Breaking field drift overrides the '{}' policy outcome", self.policy.mode);
        }

        // A PASS short-circuits before drift is consulted for impact
        let impact_drift = match decision {
            DecisionLabel::Pass => None,
            _ => field_drift.as_ref(),
        };
        let impact = ImpactClassifier::classify(decision, comparison, impact_drift);
        let gate = CicdGate::evaluate(impact.impact_tier);
        let enforcement = self.policy.profile.enforce(allowed);

        info!(
            "Decision: {} (allowed={}, severity={:?}, impact={}, gate={:?})",
            decision, allowed, decision.severity(), impact.impact_tier, gate.gate_status
        );

        Ok(Evaluation {
            comparison,
            allowed,
            decision,
            severity: decision.severity(),
            drift_detected: decision.drift_detected(),
            field_drift,
            impact,
            gate,
            enforcement,
        })
    }
}
