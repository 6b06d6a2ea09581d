//! Configuration for the summary provider and logging.
//!
//! Loaded from `doc-weaver.toml`; every field has a default so a missing or
//! partial file works. The API key itself never lives in the file, only the
//! name of the environment variable holding it.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaverConfig {
    /// OpenAI-compatible chat-completions endpoint
    pub endpoint: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Token budget per summary request
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub logging: LoggingConfig,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 1024,
            timeout_secs: 180,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level filter when RUST_LOG is not set
    pub default: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: "warn".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(ValidationError),
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ConfigIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ConfigIssue {
    EmptyField { field: &'static str },
    ZeroField { field: &'static str },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::EmptyField { field } => {
                write!(f, "config field '{field}' must not be empty")
            }
            ConfigIssue::ZeroField { field } => {
                write!(f, "config field '{field}' must be greater than zero")
            }
        }
    }
}

impl WeaverConfig {
    /// Validate the configuration, collecting every issue before failing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.endpoint.trim().is_empty() {
            issues.push(ConfigIssue::EmptyField { field: "endpoint" });
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::EmptyField { field: "model" });
        }
        if self.api_key_env.trim().is_empty() {
            issues.push(ConfigIssue::EmptyField {
                field: "api_key_env",
            });
        }
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::ZeroField { field: "max_tokens" });
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::ZeroField {
                field: "timeout_secs",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Load and validate a config from a TOML string.
pub fn load_from_str(content: &str) -> Result<WeaverConfig, ConfigError> {
    let config: WeaverConfig = toml::from_str(content)?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Load and validate a config from a TOML file.
pub fn load_from_path(path: &Path) -> Result<WeaverConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&content)
}
