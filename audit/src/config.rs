//! Audit configuration with TOML file support.

use std::path::Path;

use rla_bravo::DEFAULT_COMPLETION_QUANTILES;
use rla_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Settings shared by every audit run.
///
/// Can be loaded from a TOML file via [`AuditConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Completion probabilities offered as BRAVO sample-size options.
    #[serde(default = "default_completion_quantiles")]
    pub completion_quantiles: Vec<f64>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_completion_quantiles() -> Vec<f64> {
    DEFAULT_COMPLETION_QUANTILES.to_vec()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AuditConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Every completion quantile must be a probability strictly inside (0, 1).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(q) = self
            .completion_quantiles
            .iter()
            .find(|q| !(**q > 0.0 && **q < 1.0))
        {
            return Err(ConfigError::Invalid(format!(
                "completion quantile {q} is outside (0, 1)"
            )));
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            completion_quantiles: default_completion_quantiles(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AuditConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = AuditConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = AuditConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.completion_quantiles, vec![0.7, 0.8, 0.9]);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            completion_quantiles = [0.5, 0.95]
            log_format = "json"
        "#;
        let config = AuditConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.completion_quantiles, vec![0.5, 0.95]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn out_of_range_quantile_is_invalid() {
        let err = AuditConfig::from_toml_str("completion_quantiles = [0.9, 1.0]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "log_level = \"debug\"").expect("write");
        let config = AuditConfig::from_toml_file(file.path()).expect("should load");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_returns_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = AuditConfig::from_toml_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }
}
