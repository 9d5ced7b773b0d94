//! Configuration management for Delve.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `delve.toml` file
//! 3. User config `~/.config/delve/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! Values are validated while loading, so an unknown error policy or log
//! format never reaches the supervisor.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::policy::{ErrorPolicy, PolicyParseError};

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid supervisor.error_policy: {0}")]
    UnknownPolicy(#[from] PolicyParseError),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Supervisor behaviour.
    pub supervisor: SupervisorConfig,

    /// Log output configuration.
    pub logging: LoggingConfig,

    /// Built-in mock researcher configuration.
    pub researcher: ResearcherConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./delve.toml` (project local)
    /// 2. `~/.config/delve/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides are applied in every case.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// Does not apply environment overrides.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(policy) = std::env::var("DELVE_SUPERVISOR_ERROR_POLICY") {
            self.supervisor.error_policy = policy.parse()?;
        }

        if let Ok(level) = std::env::var("DELVE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DELVE_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(marker) = std::env::var("DELVE_RESEARCHER_FAIL_MARKER") {
            self.researcher.fail_marker = marker;
        }

        self.validate()
    }

    /// Checks values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.log_format()?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must not be empty".to_string()));
        }

        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Supervisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// What to do when a researcher dispatch fails.
    pub error_policy: ErrorPolicy,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            error_policy: DEFAULT_ERROR_POLICY,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "delve_core=debug".
    pub level: String,

    /// Output format: "pretty" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Returns the parsed output format.
    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        match self.format.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid(format!(
                "unknown log format '{}' (expected 'pretty' or 'json')",
                other
            ))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Built-in mock researcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearcherConfig {
    /// Topics containing this substring fail.
    pub fail_marker: String,
}

impl Default for ResearcherConfig {
    fn default() -> Self {
        Self {
            fail_marker: DEFAULT_FAIL_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.supervisor.error_policy, ErrorPolicy::RecordAndContinue);
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.researcher.fail_marker, DEFAULT_FAIL_MARKER);
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[supervisor]"));
        assert!(toml_str.contains("error_policy = \"record_and_continue\""));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_log_format() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.log_format().unwrap(), LogFormat::Pretty);

        logging.format = "JSON".to_string();
        assert_eq!(logging.log_format().unwrap(), LogFormat::Json);

        logging.format = "xml".to_string();
        assert!(matches!(logging.log_format(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let unknown = ConfigError::from(PolicyParseError("sometimes".to_string()));
        let invalid = ConfigError::Invalid("logging.level must not be empty".to_string());

        assert!(unknown.to_string().starts_with("Invalid supervisor.error_policy:"));
        assert!(unknown.to_string().contains("sometimes"));
        assert!(invalid.to_string().starts_with("Invalid configuration:"));
    }
}
