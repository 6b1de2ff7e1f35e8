//! Gate Runner
//!
//! Executes a single governance run. The runner never terminates the process;
//! it hands back the persisted record and the enforcement outcome and leaves
//! the exit decision to the caller.

use crate::config::GovernanceConfig;
use crate::contract::{Contract, ContractRegistry};
use crate::error::GovernanceResult;
use crate::governance::{
    AuditWriter, CompatibilityPolicy, Enforcement, GovernanceEngine, GovernanceRecord,
    PolicyDocument,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

const BANNER: &str = "==============================================";

/// Outcome of one gate run
#[derive(Debug, Clone, Serialize)]
pub struct GateRun {
    pub record: GovernanceRecord,
    pub report_path: PathBuf,
    pub enforcement: Enforcement,
}

/// Runs the governance gate against the configured artifacts
#[derive(Debug, Clone)]
pub struct GateRunner {
    registry: ContractRegistry,
    audit: AuditWriter,
}

impl GateRunner {
    pub fn new(registry: ContractRegistry, audit: AuditWriter) -> Self {
        Self { registry, audit }
    }

    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self::new(
            ContractRegistry::new(&config.contracts_dir),
            AuditWriter::new(&config.report_dir),
        )
    }

    pub fn audit(&self) -> &AuditWriter {
        &self.audit
    }

    /// Load the configured artifacts and run the gate
    pub async fn run(&self, config: &GovernanceConfig) -> GovernanceResult<GateRun> {
        info!("{}", BANNER);
        info!("🚦 CONTRACT COMPATIBILITY GOVERNANCE");
        info!("{}", BANNER);
        info!("Contract: {}", config.contract_path.display());
        info!("Policy:   {}", config.policy_path.display());

        let candidate = ContractRegistry::load_contract(&config.contract_path).await?;
        let document: PolicyDocument =
            ContractRegistry::load_document("Policy", &config.policy_path).await?;
        let policy = CompatibilityPolicy::try_from(&document)?;

        info!(
            "📋 Policy: expected {} | mode {} | profile {}",
            policy.expected_version, policy.mode, policy.profile
        );

        let baseline = self
            .registry
            .resolve_baseline(&policy.expected_version, config.baseline_path.as_deref())
            .await?;

        let run = self.evaluate(policy, &candidate, baseline.as_ref()).await?;

        info!("{}", BANNER);
        info!("🏁 GOVERNANCE RUN COMPLETE: {}", run.record.decision);
        info!("{}", BANNER);
        Ok(run)
    }

    /// Evaluate already-loaded documents and persist the record
    ///
    /// Fails with an audit error if a report for the same second exists.
    pub async fn evaluate(
        &self,
        policy: CompatibilityPolicy,
        candidate: &Contract,
        baseline: Option<&Contract>,
    ) -> GovernanceResult<GateRun> {
        let (record, enforcement) = Self::assess(policy, candidate, baseline)?;
        let report_path = self.audit.persist(&record).await?;
        Ok(Self::conclude(record, report_path, enforcement))
    }

    /// Evaluate for a caller that shares the report directory with others
    ///
    /// Writes are serialized and a taken second moves the record into the
    /// next free one, so back-to-back evaluations each get their own report.
    pub async fn evaluate_shared(
        &self,
        policy: CompatibilityPolicy,
        candidate: &Contract,
        baseline: Option<&Contract>,
    ) -> GovernanceResult<GateRun> {
        let (mut record, enforcement) = Self::assess(policy, candidate, baseline)?;
        let report_path = self.audit.persist_next_free(&mut record).await?;
        Ok(Self::conclude(record, report_path, enforcement))
    }

    fn assess(
        policy: CompatibilityPolicy,
        candidate: &Contract,
        baseline: Option<&Contract>,
    ) -> GovernanceResult<(GovernanceRecord, Enforcement)> {
        let evaluation = GovernanceEngine::new(policy).evaluate(candidate, baseline)?;
        let record = GovernanceRecord::new(&policy, candidate, baseline, &evaluation);
        Ok((record, evaluation.enforcement))
    }

    fn conclude(
        record: GovernanceRecord,
        report_path: PathBuf,
        enforcement: Enforcement,
    ) -> GateRun {
        info!(
            "📊 Impact {} ({:?}) | gate {:?} | {}",
            record.impact.impact_tier,
            record.impact.drift_category,
            record.cicd_gate.gate_status,
            record.cicd_gate.action_required
        );

        if record.cicd_gate.blocks_pipeline {
            error!("CI/CD gate blocked deployment");
        }

        GateRun {
            record,
            report_path,
            enforcement,
        }
    }
}
