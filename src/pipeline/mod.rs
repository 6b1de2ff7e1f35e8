//! Governance Gate Pipeline
//!
//! Wires the artifact registry, the governance engine and the audit writer
//! into one run:
//!
//! 1. **Load**: contract and policy must exist and parse (infrastructure failures)
//! 2. **Validate**: the policy document becomes a typed `CompatibilityPolicy`
//! 3. **Resolve**: baseline from an explicit path or the contract registry
//! 4. **Evaluate**: version comparison, drift, decision, impact and CI/CD gate
//! 5. **Audit**: the record is persisted before any enforcement happens

pub mod runner;

pub use runner::GateRunner;
