//! CI/CD Deployment Gate
//!
//! Converts an impact tier into a simulated pipeline verdict - the kind of
//! check a PR merge or deploy stage would enforce.

use super::impact::ImpactTier;
use serde::{Deserialize, Serialize};

/// Pipeline gate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Block,
    ReviewRequired,
    Warning,
    AutoApprove,
    NoAction,
    /// Open gate with no tier attached; accepted when reading reports back
    Allow,
}

/// Simulated CI/CD verdict for one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub gate_status: GateStatus,
    pub requires_manual_approval: bool,
    pub blocks_pipeline: bool,
    pub action_required: String,
}

impl GateVerdict {
    fn new(status: GateStatus, approval: bool, blocks: bool, action: &str) -> Self {
        Self {
            gate_status: status,
            requires_manual_approval: approval,
            blocks_pipeline: blocks,
            action_required: action.to_string(),
        }
    }
}

/// The deployment gate
pub struct CicdGate;

impl CicdGate {
    /// Verdict for a classified tier
    pub fn evaluate(tier: ImpactTier) -> GateVerdict {
        Self::evaluate_level(tier.level())
    }

    /// Verdict for a raw tier level; unrecognized levels read as no impact
    pub fn evaluate_level(level: u8) -> GateVerdict {
        match ImpactTier::from_level(level) {
            Some(ImpactTier::Tier1) => GateVerdict::new(
                GateStatus::Block,
                true,
                true,
                "Schema Breaking Change – Deployment Blocked",
            ),
            Some(ImpactTier::Tier2) => GateVerdict::new(
                GateStatus::ReviewRequired,
                true,
                false,
                "Type Change – Manual Architecture Review Required",
            ),
            Some(ImpactTier::Tier3) => GateVerdict::new(
                GateStatus::Warning,
                true,
                false,
                "Required Flag Change – Review Recommended",
            ),
            Some(ImpactTier::Tier4) => GateVerdict::new(
                GateStatus::AutoApprove,
                false,
                false,
                "Additive Compatible Change – Auto Approved",
            ),
            Some(ImpactTier::Tier5) | None => GateVerdict::new(
                GateStatus::NoAction,
                false,
                false,
                "No Compatibility Impact",
            ),
        }
    }
}
