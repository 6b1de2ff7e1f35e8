//! Compatibility Policy
//!
//! The policy document, the closed set of compatibility modes and execution
//! profiles, and the table that decides which version comparisons a mode
//! admits. Unknown mode or profile strings are configuration errors; nothing
//! falls through to a default.

use crate::contract::{ComparisonResult, Version};
use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named compatibility policy mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityMode {
    /// Only an exact version match
    Strict,
    /// Exact match or a newer minor
    ForwardMinor,
    /// Exact match or an older minor
    BackwardMinor,
    /// Exact match or any minor movement
    Hybrid,
    /// Soft-fail: everything is admitted and recorded for audit
    Override,
}

impl CompatibilityMode {
    pub const ALL: [CompatibilityMode; 5] = [
        CompatibilityMode::Strict,
        CompatibilityMode::ForwardMinor,
        CompatibilityMode::BackwardMinor,
        CompatibilityMode::Hybrid,
        CompatibilityMode::Override,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityMode::Strict => "strict",
            CompatibilityMode::ForwardMinor => "forward_minor",
            CompatibilityMode::BackwardMinor => "backward_minor",
            CompatibilityMode::Hybrid => "hybrid",
            CompatibilityMode::Override => "override",
        }
    }

    /// Whether this mode admits the given version comparison
    pub fn allows(&self, comparison: ComparisonResult) -> bool {
        use ComparisonResult::*;

        match self {
            CompatibilityMode::Strict => matches!(comparison, Equal),
            CompatibilityMode::ForwardMinor => matches!(comparison, Equal | MinorUpgrade),
            CompatibilityMode::BackwardMinor => matches!(comparison, Equal | MinorDowngrade),
            CompatibilityMode::Hybrid => {
                matches!(comparison, Equal | MinorUpgrade | MinorDowngrade)
            }
            CompatibilityMode::Override => true,
        }
    }
}

impl FromStr for CompatibilityMode {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| GovernanceError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly a denied evaluation is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionProfile {
    /// A denied contract stops the run
    Batch,
    /// A denied contract is logged and the run continues
    Streaming,
}

impl ExecutionProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionProfile::Batch => "batch",
            ExecutionProfile::Streaming => "streaming",
        }
    }

    /// Enforcement outcome for an allow/deny result under this profile
    pub fn enforce(&self, allowed: bool) -> Enforcement {
        match (allowed, self) {
            (true, _) => Enforcement::Proceed,
            (false, ExecutionProfile::Batch) => Enforcement::Halt,
            (false, ExecutionProfile::Streaming) => Enforcement::ContinueWithDrift,
        }
    }
}

impl FromStr for ExecutionProfile {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(ExecutionProfile::Batch),
            "streaming" => Ok(ExecutionProfile::Streaming),
            other => Err(GovernanceError::UnknownProfile(other.to_string())),
        }
    }
}

impl fmt::Display for ExecutionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller must do with an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Allowed; carry on
    Proceed,
    /// Denied under streaming; drift is recorded and the run continues
    ContinueWithDrift,
    /// Denied under batch; the run must terminate with a governance failure
    Halt,
}

fn default_execution_profile() -> String {
    ExecutionProfile::Batch.as_str().to_string()
}

/// The policy document as it appears on disk or in a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub expected_version: String,
    pub compatibility_mode: String,
    #[serde(default = "default_execution_profile")]
    pub execution_profile: String,
}

/// A validated compatibility policy, threaded explicitly into the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityPolicy {
    pub expected_version: Version,
    pub mode: CompatibilityMode,
    pub profile: ExecutionProfile,
}

impl TryFrom<&PolicyDocument> for CompatibilityPolicy {
    type Error = GovernanceError;

    fn try_from(doc: &PolicyDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            expected_version: doc.expected_version.parse()?,
            mode: doc.compatibility_mode.parse()?,
            profile: doc.execution_profile.parse()?,
        })
    }
}
