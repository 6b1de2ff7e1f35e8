//! Contract Registry
//!
//! File-backed lookup for the governance artifacts: the active contract, the
//! compatibility policy, and the baseline contract for the expected major
//! version (`<contracts_dir>/contract_v<MAJOR>.json`).

use super::{Contract, Version};
use crate::error::{GovernanceError, GovernanceResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Registry of contract documents rooted at a directory
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    contracts_dir: PathBuf,
}

impl ContractRegistry {
    pub fn new(contracts_dir: impl Into<PathBuf>) -> Self {
        Self {
            contracts_dir: contracts_dir.into(),
        }
    }

    /// Registry location of the baseline contract for a major version
    pub fn baseline_path(&self, expected: &Version) -> PathBuf {
        self.contracts_dir
            .join(format!("contract_v{}.json", expected.major))
    }

    /// Load and parse a JSON governance document, failing if it is absent
    pub async fn load_document<T: DeserializeOwned>(
        kind: &'static str,
        path: &Path,
    ) -> GovernanceResult<T> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(GovernanceError::MissingArtifact {
                kind,
                path: path.to_path_buf(),
            });
        }

        let raw = tokio::fs::read(path).await?;
        let document = serde_json::from_slice(&raw).map_err(|source| {
            GovernanceError::InvalidDocument {
                kind,
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!("Loaded {} document from {}", kind, path.display());
        Ok(document)
    }

    /// Load the active (candidate) contract
    pub async fn load_contract(path: &Path) -> GovernanceResult<Contract> {
        Self::load_document("Contract", path).await
    }

    /// Resolve the baseline contract
    ///
    /// An explicitly configured baseline must exist. A registry-resolved
    /// baseline may be absent, in which case field comparison is skipped and
    /// `None` is returned.
    pub async fn resolve_baseline(
        &self,
        expected: &Version,
        explicit: Option<&Path>,
    ) -> GovernanceResult<Option<Contract>> {
        if let Some(path) = explicit {
            let baseline = Self::load_document("Baseline contract", path).await?;
            info!("Baseline contract loaded from {}", path.display());
            return Ok(Some(baseline));
        }

        let path = self.baseline_path(expected);
        match Self::load_document::<Contract>("Baseline contract", &path).await {
            Ok(baseline) => {
                info!("Baseline contract resolved from registry: {}", path.display());
                Ok(Some(baseline))
            }
            Err(GovernanceError::MissingArtifact { .. }) => {
                warn!(
                    "Baseline contract not found at {}. Field comparison skipped.",
                    path.display()
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
