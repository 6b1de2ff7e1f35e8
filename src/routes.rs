//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod governance;

use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        .route("/health", get(health_check))
        // Governance routes
        .route("/api/governance/evaluate", post(governance::evaluate))
        .route("/api/governance/reports", get(governance::list_reports))
        .route("/api/governance/reports/{name}", get(governance::get_report))
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Governance service is running.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorsConfig, GovernanceConfig, ServerConfig};
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> Router {
        let settings = Settings {
            governance: GovernanceConfig {
                contracts_dir: dir.path().join("contracts"),
                report_dir: dir.path().join("reports"),
                ..GovernanceConfig::default()
            },
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
        };
        create_router(Arc::new(AppState::new(&settings)), &settings)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(app(&dir), get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_evaluate_reports_halt_without_exiting() {
        let dir = TempDir::new().unwrap();
        let request = post_json(
            "/api/governance/evaluate",
            json!({
                "policy": {"expected_version": "2.0", "compatibility_mode": "strict"},
                "contract": {"version": "3.0", "fields": {"id": {"type": "int", "required": true}}},
            }),
        );

        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enforcement"], "halt");
        assert_eq!(body["record"]["decision"], "HARD_FAIL");
        assert_eq!(body["record"]["cicd_gate"]["gate_status"], "BLOCK");

        let (status, listing) = send(app(&dir), get_request("/api/governance/reports")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["reports"], json!([body["reportName"].clone()]));

        let uri = format!("/api/governance/reports/{}", body["reportName"].as_str().unwrap());
        let (status, report) = send(app(&dir), get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["record"]["run_id"], body["record"]["run_id"]);
    }

    #[tokio::test]
    async fn test_evaluate_with_baseline_records_drift() {
        let dir = TempDir::new().unwrap();
        let request = post_json(
            "/api/governance/evaluate",
            json!({
                "policy": {
                    "expected_version": "2.0",
                    "compatibility_mode": "forward_minor",
                    "execution_profile": "streaming"
                },
                "contract": {"version": "2.1", "fields": {"id": {"type": "int"}, "tier": {"type": "string"}}},
                "baseline": {"version": "2.0", "fields": {"id": {"type": "int"}}},
            }),
        );

        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enforcement"], "proceed");
        assert_eq!(body["record"]["impact_tier"], 4);
        assert_eq!(body["record"]["field_drift"]["added_fields"], json!(["tier"]));
    }

    #[tokio::test]
    async fn test_back_to_back_evaluations_get_separate_reports() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let body = json!({
            "policy": {"expected_version": "2.0", "compatibility_mode": "strict"},
            "contract": {"version": "2.0", "fields": {"id": {"type": "int", "required": true}}},
        });

        let (first_status, first) =
            send(app.clone(), post_json("/api/governance/evaluate", body.clone())).await;
        let (second_status, second) =
            send(app.clone(), post_json("/api/governance/evaluate", body)).await;

        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(second["record"]["decision"], "PASS");
        assert_ne!(first["reportName"], second["reportName"]);

        let (_, listing) = send(app, get_request("/api/governance/reports")).await;
        assert_eq!(
            listing["reports"],
            json!([second["reportName"].clone(), first["reportName"].clone()])
        );
    }

    #[tokio::test]
    async fn test_unknown_mode_is_unprocessable() {
        let dir = TempDir::new().unwrap();
        let request = post_json(
            "/api/governance/evaluate",
            json!({
                "policy": {"expected_version": "2.0", "compatibility_mode": "lenient"},
                "contract": {"version": "2.0"},
            }),
        );

        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNKNOWN_MODE");
    }

    #[tokio::test]
    async fn test_unknown_report_is_not_found() {
        let dir = TempDir::new().unwrap();
        let uri = "/api/governance/reports/compatibility_report_20200101_000000.json";

        let (status, body) = send(app(&dir), get_request(uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "MISSING_ARTIFACT");
    }
}
