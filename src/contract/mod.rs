//! Data Contract Module
//!
//! The documents the governance engine consumes:
//! - Contracts (versioned field/type/required schemas)
//! - Version parsing and comparison
//! - Field-level drift detection between two contracts
//! - Loading contracts and policies from a file registry

pub mod diff;
pub mod registry;
pub mod version;

pub use diff::{DriftEngine, FieldDrift};
pub use registry::ContractRegistry;
pub use version::{ComparisonResult, Version};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Type a contract field declares
///
/// Names outside the common set are kept verbatim and compared by name, so
/// `int` to `bigint` is a type change rather than a malformed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Int,
    String,
    Float,
    Bool,
    Date,
    Timestamp,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Int => "int",
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::Timestamp => "timestamp",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "int" => FieldType::Int,
            "string" => FieldType::String,
            "float" => FieldType::Float,
            "bool" => FieldType::Bool,
            "date" => FieldType::Date,
            "timestamp" => FieldType::Timestamp,
            _ => FieldType::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor for a single contract field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Absent flags read as `false`, so omitting the flag and writing
    /// `"required": false` describe the same field
    #[serde(default)]
    pub required: bool,
}

/// A versioned data contract
///
/// Field names are unique by construction; a `BTreeMap` keeps iteration and
/// serialization order stable so checksums are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub version: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
}

impl Contract {
    /// SHA-256 fingerprint over the version and the sorted field descriptors
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.version.as_bytes());
        for (name, spec) in &self.fields {
            hasher.update(
                format!("{}:{}:{}", name, spec.field_type, spec.required).as_bytes(),
            );
        }

        let result = hasher.finalize();
        format!("{:x}", result)
    }
}

#[cfg(test)]
impl Contract {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        required: bool,
    ) -> Self {
        self.fields.insert(name.into(), FieldSpec { field_type, required });
        self
    }
}
