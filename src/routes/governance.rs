//! Governance API Routes
//!
//! Evaluate contracts over HTTP and browse persisted compatibility reports.
//! Evaluation never stops the server; a denied contract is reported through
//! the `enforcement` field.

use crate::contract::Contract;
use crate::error::GovernanceError;
use crate::governance::{CompatibilityPolicy, Enforcement, GovernanceRecord, PolicyDocument};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub policy: PolicyDocument,
    pub contract: Contract,
    /// Field drift is skipped when absent
    pub baseline: Option<Contract>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub success: bool,
    pub enforcement: Enforcement,
    pub report_name: String,
    pub record: GovernanceRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListResponse {
    pub success: bool,
    pub reports: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub success: bool,
    pub record: GovernanceRecord,
}

// ==================== Handlers ====================

/// POST /api/governance/evaluate
pub async fn evaluate(
    State(state): State<SharedState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, GovernanceError> {
    let policy = CompatibilityPolicy::try_from(&req.policy)?;
    let run = state
        .runner
        .evaluate_shared(policy, &req.contract, req.baseline.as_ref())
        .await?;

    Ok(Json(EvaluateResponse {
        success: true,
        enforcement: run.enforcement,
        report_name: run.record.report_file_name(),
        record: run.record,
    }))
}

/// GET /api/governance/reports
pub async fn list_reports(
    State(state): State<SharedState>,
) -> Result<Json<ReportListResponse>, GovernanceError> {
    let reports = state.runner.audit().list().await?;

    Ok(Json(ReportListResponse {
        success: true,
        reports,
    }))
}

/// GET /api/governance/reports/{name}
pub async fn get_report(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ReportResponse>, GovernanceError> {
    let record = state.runner.audit().read(&name).await?;

    Ok(Json(ReportResponse {
        success: true,
        record,
    }))
}
