//! Configuration Management Module
//!
//! Runtime configuration for the triage service. Values come from built-in
//! defaults, an optional TOML file, and `TRIAGE__`-prefixed environment
//! variables, in that order of precedence (later wins).

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix, e.g. `TRIAGE__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "TRIAGE";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub server: ServerConfig,
    pub collaborators: CollaboratorConfig,
    pub locator: LocatorConfig,
    pub remediation: RemediationConfig,
    pub logging: LoggingConfig,
    pub topology: TopologyConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Name reported by the health endpoint
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            service_name: "triage".to_string(),
        }
    }
}

/// Collaborator endpoints. An unset URL selects the in-memory stand-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    pub error_source_url: Option<String>,
    pub code_context_url: Option<String>,
}

/// Stack trace parsing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Path fragment identifying in-application frames
    pub source_marker: String,
    /// Deployment root stripped from file paths
    pub app_root_marker: String,
    /// Recognized source file extensions
    pub extensions: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            source_marker: "src/".to_string(),
            app_root_marker: "/app/".to_string(),
            extensions: vec![".js".to_string(), ".ts".to_string()],
        }
    }
}

/// Remediation decision settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Occurrence count at which timeouts and leaks escalate to a code fix
    pub escalation_threshold: u64,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 10,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Deployment unit to pipeline mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub deployment_unit: String,
    pub pipeline_id: String,
    pub pipeline_name: String,
    pub build_number: String,
    pub repository: String,
}

/// Service name to repository mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub service: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub last_commit: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Static topology tables. Order matters: service matching is first-match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub pipelines: Vec<PipelineEntry>,
    pub services: Vec<ServiceEntry>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        let pipeline = |unit: &str, id: &str, name: &str, build: &str, repo: &str| PipelineEntry {
            deployment_unit: unit.to_string(),
            pipeline_id: id.to_string(),
            pipeline_name: name.to_string(),
            build_number: build.to_string(),
            repository: repo.to_string(),
        };
        let service = |name: &str, repo: &str| ServiceEntry {
            service: name.to_string(),
            repository: repo.to_string(),
            branch: default_branch(),
            last_commit: "abc123def456".to_string(),
        };

        Self {
            pipelines: vec![
                pipeline(
                    "aks-nodepool1-12345",
                    "pipeline-001",
                    "user-service-ci-cd",
                    "234",
                    "company/user-service",
                ),
                pipeline(
                    "aks-nodepool1-67890",
                    "pipeline-002",
                    "payment-service-ci-cd",
                    "156",
                    "company/payment-service",
                ),
                pipeline(
                    "aks-nodepool1-11223",
                    "pipeline-003",
                    "analytics-service-ci-cd",
                    "89",
                    "company/analytics-service",
                ),
            ],
            services: vec![
                service("user-service", "company/user-service"),
                service("payment-service", "company/payment-service"),
                service("analytics-service", "company/analytics-service"),
                service("order-service", "company/order-service"),
            ],
        }
    }
}

impl TriageConfig {
    /// Load configuration from an optional TOML file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(TriageError::Configuration(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: TriageConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TriageConfig =
            toml::from_str(content).map_err(|e| TriageError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(TriageError::Configuration(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.locator.source_marker.is_empty() || self.locator.app_root_marker.is_empty() {
            return Err(TriageError::Configuration(
                "locator markers must not be empty".to_string(),
            ));
        }
        if self.locator.extensions.iter().all(|ext| ext.is_empty()) {
            return Err(TriageError::Configuration(
                "locator.extensions must name at least one extension".to_string(),
            ));
        }
        if self.remediation.escalation_threshold == 0 {
            return Err(TriageError::Configuration(
                "remediation.escalation_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TriageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.remediation.escalation_threshold, 10);
        assert_eq!(config.topology.pipelines.len(), 3);
        assert_eq!(config.topology.services[0].service, "user-service");
        assert!(config.collaborators.error_source_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TriageConfig::from_toml_str(
            r#"
            [server]
            port = 8088

            [collaborators]
            error_source_url = "http://localhost:3002"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.collaborators.error_source_url.as_deref(),
            Some("http://localhost:3002")
        );
        assert_eq!(config.locator.source_marker, "src/");
    }

    #[test]
    fn test_topology_override_replaces_tables() {
        let config = TriageConfig::from_toml_str(
            r#"
            [[topology.services]]
            service = "billing"
            repository = "acme/billing"
            last_commit = "feedbeef"
            "#,
        )
        .unwrap();

        assert_eq!(config.topology.services.len(), 1);
        assert_eq!(config.topology.services[0].branch, "main");
        // pipelines untouched
        assert_eq!(config.topology.pipelines.len(), 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TriageConfig::from_toml_str("[remediation]\nescalation_threshold = 0\n");
        assert!(matches!(err, Err(TriageError::Configuration(_))));

        let err = TriageConfig::from_toml_str("[locator]\nsource_marker = \"\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\njson = true").unwrap();

        let config = TriageConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_missing_file() {
        let result = TriageConfig::load(Some(Path::new("/nonexistent/triage.toml")));
        assert!(matches!(result, Err(TriageError::Configuration(_))));
    }
}
