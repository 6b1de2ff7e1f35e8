//! Governance Audit Writer
//!
//! Persists the full decision record of an evaluation as a timestamped JSON
//! artifact (`compatibility_report_<yyyymmdd_HHMMSS>.json`) for later
//! inspection. Reports are written once and never overwritten. `persist`
//! fails when the name for that second is taken; `persist_next_free`
//! serializes writers and moves the record into the next free second.

use super::decision::{DecisionLabel, Evaluation, Severity};
use super::gate::GateVerdict;
use super::impact::ImpactAssessment;
use super::policy::{CompatibilityMode, CompatibilityPolicy, ExecutionProfile};
use crate::contract::{ComparisonResult, Contract, ContractRegistry, FieldDrift};
use crate::error::{GovernanceError, GovernanceResult};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

const REPORT_PREFIX: &str = "compatibility_report_";

/// Seconds `persist_next_free` will advance before giving up
const MAX_SLOT_ATTEMPTS: usize = 5;

static REPORT_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^compatibility_report_\d{8}_\d{6}\.json$").expect("report pattern is a valid regex")
});

/// The full audit artifact for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceRecord {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub expected_version: String,
    pub contract_version: String,
    pub comparison_result: ComparisonResult,
    pub compatibility_mode: CompatibilityMode,
    pub execution_profile: ExecutionProfile,
    pub allowed: bool,
    pub decision: DecisionLabel,
    pub severity: Severity,
    pub drift_detected: bool,
    /// `null` when no baseline contract was available
    pub field_drift: Option<FieldDrift>,
    #[serde(flatten)]
    pub impact: ImpactAssessment,
    pub cicd_gate: GateVerdict,
    pub contract_checksum: String,
    pub baseline_checksum: Option<String>,
}

impl GovernanceRecord {
    /// Assemble the record for an evaluation, stamped with the current time
    pub fn new(
        policy: &CompatibilityPolicy,
        candidate: &Contract,
        baseline: Option<&Contract>,
        evaluation: &Evaluation,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            expected_version: policy.expected_version.to_string(),
            contract_version: candidate.version.clone(),
            comparison_result: evaluation.comparison,
            compatibility_mode: policy.mode,
            execution_profile: policy.profile,
            allowed: evaluation.allowed,
            decision: evaluation.decision,
            severity: evaluation.severity,
            drift_detected: evaluation.drift_detected,
            field_drift: evaluation.field_drift.clone(),
            impact: evaluation.impact,
            cicd_gate: evaluation.gate.clone(),
            contract_checksum: candidate.checksum(),
            baseline_checksum: baseline.map(Contract::checksum),
        }
    }

    /// Deterministic report file name for this record
    pub fn report_file_name(&self) -> String {
        report_file_name(&self.timestamp)
    }
}

/// Report file name for a UTC timestamp, second resolution
pub fn report_file_name(timestamp: &DateTime<Utc>) -> String {
    format!("{}{}.json", REPORT_PREFIX, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Whether a name is a well-formed report file name
pub fn is_report_name(name: &str) -> bool {
    REPORT_NAME_PATTERN.is_match(name)
}

/// Writes and reads compatibility reports in a directory
#[derive(Debug, Clone)]
pub struct AuditWriter {
    report_dir: PathBuf,
    /// Shared by clones so concurrent writers take turns
    write_lock: Arc<Mutex<()>>,
}

impl AuditWriter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Persist a record, creating the report directory if needed
    ///
    /// Returns the path written. Fails if a report for the same second
    /// already exists.
    pub async fn persist(&self, record: &GovernanceRecord) -> GovernanceResult<PathBuf> {
        match self.try_create(record).await? {
            Some(path) => Ok(path),
            None => Err(GovernanceError::Audit(format!(
                "report {} already exists; refusing to overwrite",
                self.report_dir.join(record.report_file_name()).display()
            ))),
        }
    }

    /// Persist a record under the first free report name
    ///
    /// Writers holding the same `AuditWriter` (or a clone) take turns. When
    /// the record's second is taken, waits for the next second, restamps the
    /// record and tries again, so the returned path always matches
    /// `record.report_file_name()`.
    pub async fn persist_next_free(
        &self,
        record: &mut GovernanceRecord,
    ) -> GovernanceResult<PathBuf> {
        let _guard = self.write_lock.lock().await;

        for _ in 0..MAX_SLOT_ATTEMPTS {
            if let Some(path) = self.try_create(record).await? {
                return Ok(path);
            }

            let taken = record.report_file_name();
            while report_file_name(&Utc::now()) == taken {
                let elapsed = u64::from(Utc::now().timestamp_subsec_millis().min(999));
                tokio::time::sleep(Duration::from_millis(1000 - elapsed)).await;
            }

            tracing::debug!("Report slot {} taken, restamping record", taken);
            record.timestamp = Utc::now();
        }

        Err(GovernanceError::Audit(format!(
            "no free report name in {} after {} attempts",
            self.report_dir.display(),
            MAX_SLOT_ATTEMPTS
        )))
    }

    /// Write the record with `create_new`; `None` when the name is taken
    async fn try_create(&self, record: &GovernanceRecord) -> GovernanceResult<Option<PathBuf>> {
        tokio::fs::create_dir_all(&self.report_dir).await?;

        let path = self.report_dir.join(record.report_file_name());
        let body = serde_json::to_vec_pretty(record)
            .map_err(|e| GovernanceError::Audit(format!("failed to serialize record: {}", e)))?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        file.write_all(&body).await?;
        file.flush().await?;

        tracing::info!("📝 Compatibility report written: {}", path.display());
        Ok(Some(path))
    }

    /// Report names in the directory, newest first
    pub async fn list(&self) -> GovernanceResult<Vec<String>> {
        let mut names = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.report_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if is_report_name(name) {
                    names.push(name.to_string());
                }
            }
        }

        // Timestamped names sort chronologically
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Read one persisted record back by report name
    ///
    /// Names that are not report names are never joined onto the directory
    /// and read as missing.
    pub async fn read(&self, name: &str) -> GovernanceResult<GovernanceRecord> {
        if !is_report_name(name) {
            return Err(GovernanceError::MissingArtifact {
                kind: "Compatibility report",
                path: PathBuf::from(name),
            });
        }

        let path = self.report_dir.join(name);
        ContractRegistry::load_document("Compatibility report", &path).await
    }
}
