//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::config::Settings;
use crate::pipeline::GateRunner;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Gate runner bound to the configured registry and report directory
    pub runner: GateRunner,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            runner: GateRunner::from_config(&settings.governance),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
