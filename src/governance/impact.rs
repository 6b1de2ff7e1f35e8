//! Impact Classifier
//!
//! Converts the decision label and drift signals into an enterprise impact
//! tier. Rules are evaluated most-severe first and the first match wins:
//!
//! | Tier | Trigger                               | Category                 | Review | Blocks |
//! |------|---------------------------------------|--------------------------|--------|--------|
//! | 1    | decision is FIELD_BREAKING_CHANGE     | BREAKING_SCHEMA_CHANGE   | yes    | yes    |
//! | 1    | comparison is MAJOR_UPGRADE           | MAJOR_VERSION_BREAK      | yes    | yes    |
//! | 2    | drift has type changes                | TYPE_CHANGE              | yes    | no     |
//! | 3    | drift has required-flag changes       | REQUIRED_FLAG_CHANGE     | yes    | no     |
//! | 4    | drift has added fields                | ADDITIVE_CHANGE          | no     | no     |
//! | 5    | otherwise                             | NO_IMPACT                | no     | no     |

use super::decision::DecisionLabel;
use crate::contract::{ComparisonResult, FieldDrift};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enterprise impact tier, 1 (most severe) through 5 (no impact)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ImpactTier {
    Tier1 = 1,
    Tier2 = 2,
    Tier3 = 3,
    Tier4 = 4,
    Tier5 = 5,
}

impl ImpactTier {
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Tier for a raw level, `None` outside 1..=5
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(ImpactTier::Tier1),
            2 => Some(ImpactTier::Tier2),
            3 => Some(ImpactTier::Tier3),
            4 => Some(ImpactTier::Tier4),
            5 => Some(ImpactTier::Tier5),
            _ => None,
        }
    }
}

impl From<ImpactTier> for u8 {
    fn from(tier: ImpactTier) -> Self {
        tier.level()
    }
}

impl TryFrom<u8> for ImpactTier {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        ImpactTier::from_level(level).ok_or_else(|| format!("impact tier out of range: {}", level))
    }
}

impl fmt::Display for ImpactTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIER {}", self.level())
    }
}

/// What kind of drift drove the tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftCategory {
    BreakingSchemaChange,
    MajorVersionBreak,
    TypeChange,
    RequiredFlagChange,
    AdditiveChange,
    NoImpact,
}

/// Result of impact classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub impact_tier: ImpactTier,
    pub drift_category: DriftCategory,
    pub requires_review: bool,
    pub blocks_deployment: bool,
}

impl ImpactAssessment {
    fn new(
        impact_tier: ImpactTier,
        drift_category: DriftCategory,
        requires_review: bool,
        blocks_deployment: bool,
    ) -> Self {
        Self {
            impact_tier,
            drift_category,
            requires_review,
            blocks_deployment,
        }
    }
}

/// Classifies evaluations into impact tiers
pub struct ImpactClassifier;

impl ImpactClassifier {
    /// Classify a decision into an [`ImpactAssessment`]
    ///
    /// `field_drift` is `None` when no baseline was available; the drift rules
    /// (tiers 2-4) can only fire when it is present.
    pub fn classify(
        decision: DecisionLabel,
        comparison: ComparisonResult,
        field_drift: Option<&FieldDrift>,
    ) -> ImpactAssessment {
        use DriftCategory::*;
        use ImpactTier::*;

        if decision == DecisionLabel::FieldBreakingChange {
            return ImpactAssessment::new(Tier1, BreakingSchemaChange, true, true);
        }

        if comparison == ComparisonResult::MajorUpgrade {
            return ImpactAssessment::new(Tier1, MajorVersionBreak, true, true);
        }

        match field_drift {
            Some(drift) if !drift.type_changes.is_empty() => {
                ImpactAssessment::new(Tier2, TypeChange, true, false)
            }
            Some(drift) if !drift.required_changes.is_empty() => {
                ImpactAssessment::new(Tier3, RequiredFlagChange, true, false)
            }
            Some(drift) if !drift.added_fields.is_empty() => {
                ImpactAssessment::new(Tier4, AdditiveChange, false, false)
            }
            _ => ImpactAssessment::new(Tier5, NoImpact, false, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_field_breaking_change_is_always_tier1() {
        let drift = FieldDrift {
            removed_fields: set(&["email"]),
            ..Default::default()
        };

        for comparison in ComparisonResult::ALL {
            for field_drift in [None, Some(&drift)] {
                let impact = ImpactClassifier::classify(
                    DecisionLabel::FieldBreakingChange,
                    comparison,
                    field_drift,
                );
                assert_eq!(impact.impact_tier, ImpactTier::Tier1);
                assert_eq!(impact.drift_category, DriftCategory::BreakingSchemaChange);
                assert!(impact.requires_review && impact.blocks_deployment);
            }
        }
    }

    #[test]
    fn test_major_upgrade_is_version_break() {
        let impact =
            ImpactClassifier::classify(DecisionLabel::HardFail, ComparisonResult::MajorUpgrade, None);

        assert_eq!(impact.impact_tier, ImpactTier::Tier1);
        assert_eq!(impact.drift_category, DriftCategory::MajorVersionBreak);
    }

    #[test]
    fn test_major_downgrade_without_drift_is_no_impact() {
        let impact = ImpactClassifier::classify(
            DecisionLabel::HardFail,
            ComparisonResult::MajorDowngrade,
            None,
        );

        assert_eq!(impact.impact_tier, ImpactTier::Tier5);
        assert_eq!(impact.drift_category, DriftCategory::NoImpact);
    }

    #[test]
    fn test_drift_rules_in_severity_order() {
        let mut drift = FieldDrift {
            added_fields: set(&["loyalty_tier"]),
            ..Default::default()
        };
        let classify = |d: &FieldDrift| {
            ImpactClassifier::classify(
                DecisionLabel::PassWithForwardCompat,
                ComparisonResult::MinorUpgrade,
                Some(d),
            )
        };

        assert_eq!(classify(&drift).impact_tier, ImpactTier::Tier4);
        assert!(!classify(&drift).requires_review);

        drift.required_changes = set(&["city"]);
        assert_eq!(classify(&drift).impact_tier, ImpactTier::Tier3);
        assert_eq!(classify(&drift).drift_category, DriftCategory::RequiredFlagChange);

        drift.type_changes = set(&["spend"]);
        let impact = classify(&drift);
        assert_eq!(impact.impact_tier, ImpactTier::Tier2);
        assert!(impact.requires_review);
        assert!(!impact.blocks_deployment);
    }

    #[test]
    fn test_no_baseline_collapses_to_tier5() {
        let impact = ImpactClassifier::classify(
            DecisionLabel::PassWithForwardCompat,
            ComparisonResult::MinorUpgrade,
            None,
        );
        assert_eq!(impact.impact_tier, ImpactTier::Tier5);

        // An empty drift (baseline present, nothing changed) lands in the same tier
        let empty = FieldDrift::default();
        let impact = ImpactClassifier::classify(
            DecisionLabel::Pass,
            ComparisonResult::Equal,
            Some(&empty),
        );
        assert_eq!(impact.impact_tier, ImpactTier::Tier5);
    }

    #[test]
    fn test_tier_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ImpactTier::Tier3).unwrap(), "3");
        assert_eq!(serde_json::from_str::<ImpactTier>("1").unwrap(), ImpactTier::Tier1);
        assert!(serde_json::from_str::<ImpactTier>("9").is_err());
    }

    #[test]
    fn test_tier_severity_ordering() {
        // Lower level means more severe
        assert!(ImpactTier::Tier1 < ImpactTier::Tier2);
        assert!(ImpactTier::Tier4 < ImpactTier::Tier5);
    }
}
