//! Contract Gate - Contract Compatibility Governance
//!
//! Decides whether a versioned data contract may be used against the version a
//! compatibility policy expects, detects field-level drift against a baseline,
//! classifies the impact and produces a CI/CD gate verdict. Every evaluation is
//! persisted as an audit report.
//!
//! MODES:
//! - `gate` (default): one run against the configured artifacts. Exit code 0
//!   on success, 1 on infrastructure failure, 2 on a governance breach.
//! - `serve`: HTTP evaluation service; breaches are reported, never enforced.

mod config;
mod contract;
mod error;
mod governance;
mod pipeline;
mod routes;
mod state;

use crate::config::{LogConfig, LogFormat, Settings};
use crate::error::{EXIT_INFRASTRUCTURE, EXIT_SUCCESS};
use crate::governance::{exit_code_for, Enforcement, TerminationHandler};
use crate::pipeline::GateRunner;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (ignore errors if file not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing subscriber for structured logging
    init_tracing(&LogConfig::from_env());

    let mode = std::env::args().nth(1).unwrap_or_else(|| "gate".to_string());

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            return TerminationHandler::terminate(e.to_string(), EXIT_INFRASTRUCTURE, false).into();
        }
    };
    info!("📋 Configuration loaded successfully");

    match mode.as_str() {
        "gate" => run_gate(&settings).await,
        "serve" => match serve(settings).await {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                error!("❌ Server error: {:#}", e);
                ExitCode::from(EXIT_INFRASTRUCTURE)
            }
        },
        other => {
            error!("❌ Unknown command '{}'. Expected 'gate' or 'serve'", other);
            ExitCode::from(EXIT_INFRASTRUCTURE)
        }
    }
}

/// Run the governance gate once and map the outcome to an exit code
async fn run_gate(settings: &Settings) -> ExitCode {
    let runner = GateRunner::from_config(&settings.governance);

    let outcome = runner.run(&settings.governance).await;
    let exit_code = exit_code_for(outcome.as_ref().map(|run| run.enforcement));

    let run = match outcome {
        Ok(run) => run,
        Err(e) => return TerminationHandler::terminate(e.to_string(), exit_code, false).into(),
    };

    match run.enforcement {
        Enforcement::Proceed => {
            info!("✅ Contract admitted: {}", run.record.decision);
            ExitCode::from(exit_code)
        }
        Enforcement::ContinueWithDrift => {
            warn!(
                "⚠️  Contract denied ({}) but streaming profile continues; drift recorded in {}",
                run.record.decision,
                run.report_path.display()
            );
            ExitCode::from(exit_code)
        }
        Enforcement::Halt => TerminationHandler::terminate(
            "Compatibility enforcement failed (batch mode).",
            exit_code,
            false,
        )
        .into(),
    }
}

/// Run the HTTP evaluation service until shutdown
async fn serve(settings: Settings) -> anyhow::Result<()> {
    info!("🚀 Starting Contract Gate evaluation service...");

    let state = Arc::new(AppState::new(&settings));
    let report_dir = state.runner.audit().report_dir().display().to_string();
    let app = create_router(state, &settings);

    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   GET  /health                          - Liveness check");
    info!("   POST /api/governance/evaluate         - Evaluate a contract against a policy");
    info!("   GET  /api/governance/reports          - List compatibility reports");
    info!("   GET  /api/governance/reports/{{name}}   - Fetch one compatibility report");
    info!("");
    info!("📁 Reports directory: {}", report_dir);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
///
/// `RUST_LOG` wins over `LOG_LEVEL`; an unparseable level falls back to `info`.
fn init_tracing(log: &LogConfig) {
    let (env_filter, bad_level) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(&log.level) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new("info"), Some(log.level.clone())),
        },
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match log.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init(),
    }

    if let Some(level) = bad_level {
        warn!("⚠️  Invalid LOG_LEVEL '{}', falling back to info", level);
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
