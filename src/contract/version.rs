//! Version Comparator
//!
//! Classifies how a contract's declared `MAJOR.MINOR` version relates to the
//! version a policy expects. Majors dominate: minors are only consulted when
//! the majors agree.

use crate::error::{GovernanceError, GovernanceResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)$").expect("version pattern is a valid regex"));

/// A two-part contract version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    /// Classify this (contract) version against the expected one
    pub fn compare_to(&self, expected: &Version) -> ComparisonResult {
        match self.major.cmp(&expected.major) {
            Ordering::Greater => ComparisonResult::MajorUpgrade,
            Ordering::Less => ComparisonResult::MajorDowngrade,
            Ordering::Equal => match self.minor.cmp(&expected.minor) {
                Ordering::Greater => ComparisonResult::MinorUpgrade,
                Ordering::Less => ComparisonResult::MinorDowngrade,
                Ordering::Equal => ComparisonResult::Equal,
            },
        }
    }
}

impl FromStr for Version {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| GovernanceError::VersionParse(s.to_string()))?;

        // Digits-only captures can still overflow u64
        let component = |idx: usize| {
            caps[idx]
                .parse::<u64>()
                .map_err(|_| GovernanceError::VersionParse(s.to_string()))
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Ordering relationship between a contract version and the expected version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonResult {
    #[serde(alias = "EXACT_MATCH")]
    Equal,
    MinorUpgrade,
    MajorUpgrade,
    MinorDowngrade,
    MajorDowngrade,
}

impl ComparisonResult {
    #[cfg(test)]
    pub const ALL: [ComparisonResult; 5] = [
        ComparisonResult::Equal,
        ComparisonResult::MinorUpgrade,
        ComparisonResult::MajorUpgrade,
        ComparisonResult::MinorDowngrade,
        ComparisonResult::MajorDowngrade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonResult::Equal => "EQUAL",
            ComparisonResult::MinorUpgrade => "MINOR_UPGRADE",
            ComparisonResult::MajorUpgrade => "MAJOR_UPGRADE",
            ComparisonResult::MinorDowngrade => "MINOR_DOWNGRADE",
            ComparisonResult::MajorDowngrade => "MAJOR_DOWNGRADE",
        }
    }

    /// Label used in human-facing reports, where equality reads as an exact match
    pub fn report_label(&self) -> &'static str {
        match self {
            ComparisonResult::Equal => "EXACT_MATCH",
            other => other.as_str(),
        }
    }

    /// The classification obtained when the two versions swap roles
    #[cfg(test)]
    pub fn inverse(&self) -> ComparisonResult {
        match self {
            ComparisonResult::Equal => ComparisonResult::Equal,
            ComparisonResult::MinorUpgrade => ComparisonResult::MinorDowngrade,
            ComparisonResult::MajorUpgrade => ComparisonResult::MajorDowngrade,
            ComparisonResult::MinorDowngrade => ComparisonResult::MinorUpgrade,
            ComparisonResult::MajorDowngrade => ComparisonResult::MajorUpgrade,
        }
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare a contract's declared version against the expected version
///
/// String-level form of [`Version::compare_to`]; both sides must parse.
pub fn compare(
    contract_version: &str,
    expected_version: &str,
) -> GovernanceResult<ComparisonResult> {
    let expected: Version = expected_version.parse()?;
    let contract: Version = contract_version.parse()?;
    Ok(contract.compare_to(&expected))
}
