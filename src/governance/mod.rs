//! Governance Engine
//!
//! Policy evaluation, impact classification, the CI/CD gate, audit
//! persistence and process termination for contract compatibility checks.

pub mod audit;
pub mod decision;
pub mod gate;
pub mod impact;
pub mod policy;
pub mod termination;

pub use audit::{AuditWriter, GovernanceRecord};
pub use decision::GovernanceEngine;
pub use policy::{CompatibilityPolicy, Enforcement, PolicyDocument};
pub use termination::{exit_code_for, TerminationHandler};
