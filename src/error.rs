//! Error handling module
//!
//! Provides the governance error taxonomy shared by the gate runner and the
//! HTTP evaluation service. Every fatal condition carries the exit code the
//! termination handler reports for it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::error;

/// Exit code for a successful run with no governance breach
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for infrastructure failures (missing or unreadable artifacts)
pub const EXIT_INFRASTRUCTURE: u8 = 1;

/// Exit code for governance breaches and policy configuration errors
pub const EXIT_GOVERNANCE: u8 = 2;

/// Governance-wide error type
#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("Invalid version format '{0}'. Expected MAJOR.MINOR")]
    VersionParse(String),

    #[error("Unknown compatibility mode: {0}")]
    UnknownMode(String),

    #[error("Unknown execution profile: {0}")]
    UnknownProfile(String),

    #[error("{kind} file not found: {}", .path.display())]
    MissingArtifact { kind: &'static str, path: PathBuf },

    #[error("Invalid {kind} document {}: {source}", .path.display())]
    InvalidDocument {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Audit report error: {0}")]
    Audit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GovernanceError {
    /// Process exit code the termination handler reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            GovernanceError::VersionParse(_)
            | GovernanceError::UnknownMode(_)
            | GovernanceError::UnknownProfile(_) => EXIT_GOVERNANCE,
            GovernanceError::MissingArtifact { .. }
            | GovernanceError::InvalidDocument { .. }
            | GovernanceError::Audit(_)
            | GovernanceError::Io(_) => EXIT_INFRASTRUCTURE,
        }
    }

    /// Stable machine-readable code used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::VersionParse(_) => "VERSION_PARSE_ERROR",
            GovernanceError::UnknownMode(_) => "UNKNOWN_MODE",
            GovernanceError::UnknownProfile(_) => "UNKNOWN_PROFILE",
            GovernanceError::MissingArtifact { .. } => "MISSING_ARTIFACT",
            GovernanceError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            GovernanceError::Audit(_) => "AUDIT_ERROR",
            GovernanceError::Io(_) => "IO_ERROR",
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for GovernanceError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            GovernanceError::VersionParse(_)
            | GovernanceError::UnknownMode(_)
            | GovernanceError::UnknownProfile(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                self.to_string(),
                None,
            ),
            GovernanceError::MissingArtifact { .. } => {
                (StatusCode::NOT_FOUND, self.to_string(), None)
            }
            GovernanceError::InvalidDocument { source, .. } => (
                StatusCode::BAD_REQUEST,
                "Governance document could not be parsed".to_string(),
                Some(source.to_string()),
            ),
            GovernanceError::Audit(msg) => {
                error!("Audit error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Compatibility report could not be persisted".to_string(),
                    Some(msg.clone()),
                )
            }
            GovernanceError::Io(e) => {
                error!("I/O error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(self.code().to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
