//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Locations of the governance artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceConfig {
    pub contract_path: PathBuf,
    pub policy_path: PathBuf,
    /// Explicit baseline; when unset the registry directory is consulted
    pub baseline_path: Option<PathBuf>,
    pub contracts_dir: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            contract_path: PathBuf::from("contracts/contract_v2.json"),
            policy_path: PathBuf::from("policies/compatibility_policy.json"),
            baseline_path: None,
            contracts_dir: PathBuf::from("contracts"),
            report_dir: PathBuf::from("reports"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    /// Read logging settings ahead of the full settings load, so the
    /// subscriber is up when configuration errors are reported
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Self {
            level: lookup("LOG_LEVEL")
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| LogConfig::default().level),
            format,
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub governance: GovernanceConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = GovernanceConfig::default();
        let path_or = |name: &str, default: PathBuf| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };

        let governance = GovernanceConfig {
            contract_path: path_or("GOVERNANCE_CONTRACT", defaults.contract_path),
            policy_path: path_or("GOVERNANCE_POLICY", defaults.policy_path),
            baseline_path: lookup("GOVERNANCE_BASELINE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            contracts_dir: path_or("GOVERNANCE_CONTRACTS_DIR", defaults.contracts_dir),
            report_dir: path_or("GOVERNANCE_REPORT_DIR", defaults.report_dir),
        };

        let server = ServerConfig {
            host: match lookup("HOST") {
                Some(h) => h.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "HOST",
                    value: h,
                })?,
                None => ServerConfig::default().host,
            },
            port: match lookup("PORT") {
                Some(p) => p.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "PORT",
                    value: p,
                })?,
                None => ServerConfig::default().port,
            },
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        Ok(Self {
            governance,
            server,
            cors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.governance, GovernanceConfig::default());
        assert_eq!(settings.governance.baseline_path, None);
        assert_eq!(LogConfig::from_lookup(lookup(&[])), LogConfig::default());
        assert_eq!(settings.cors, CorsConfig::default());
    }

    #[test]
    fn test_governance_paths_from_environment() {
        let settings = Settings::from_lookup(lookup(&[
            ("GOVERNANCE_CONTRACT", "/data/contract_v3.json"),
            ("GOVERNANCE_BASELINE", "/data/baseline.json"),
            ("GOVERNANCE_REPORT_DIR", "/var/reports"),
            ("GOVERNANCE_POLICY", "  "),
        ]))
        .unwrap();

        assert_eq!(settings.governance.contract_path, PathBuf::from("/data/contract_v3.json"));
        assert_eq!(
            settings.governance.baseline_path,
            Some(PathBuf::from("/data/baseline.json"))
        );
        assert_eq!(settings.governance.report_dir, PathBuf::from("/var/reports"));
        // Blank values fall back to defaults
        assert_eq!(
            settings.governance.policy_path,
            PathBuf::from("policies/compatibility_policy.json")
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));
    }

    #[test]
    fn test_log_format_and_origins() {
        let log = LogConfig::from_lookup(lookup(&[("LOG_FORMAT", "JSON"), ("LOG_LEVEL", "debug")]));
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.level, "debug");

        let settings = Settings::from_lookup(lookup(&[(
            "ALLOWED_ORIGINS",
            "https://a.example, https://b.example",
        )]))
        .unwrap();
        assert_eq!(
            settings.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
