//! Configuration file loading and parsing.

use crate::env::vars;
use crate::types::SandstockConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "sandstock.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("invalid expansion pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Configuration loader.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given configuration file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loader for `SANDSTOCK_CONFIG_PATH`, falling back to `./sandstock.yaml`.
    pub fn from_env() -> Self {
        let path = std::env::var(vars::SANDSTOCK_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration file, or defaults when it does not exist,
    /// then apply environment overrides and validate.
    pub fn load(&self) -> Result<SandstockConfig, ConfigError> {
        let mut config = if self.path.exists() {
            let contents = std::fs::read_to_string(&self.path)?;
            let expanded = expand_env_vars(&contents, |var| std::env::var(var).ok())?;
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        } else {
            SandstockConfig::default()
        };

        apply_overrides(&mut config, |var| std::env::var(var).ok())?;
        validate(&config)?;
        Ok(config)
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;
    let mut result = content.to_string();

    for cap in re.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];

        let value = match (lookup(var_name), cap.get(2)) {
            (Some(v), _) => v,
            (None, Some(default)) => default.as_str().to_string(),
            (None, None) => {
                return Err(ConfigError::EnvVarNotFound {
                    var: var_name.to_string(),
                })
            }
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Apply `SANDSTOCK_DATABASE_PATH` and `SANDSTOCK_CHANGELOG_MODE`.
fn apply_overrides(
    config: &mut SandstockConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(path) = lookup(vars::SANDSTOCK_DATABASE_PATH) {
        config.database.path = path;
    }

    if let Some(mode) = lookup(vars::SANDSTOCK_CHANGELOG_MODE) {
        config.changelog.mode = mode.parse().map_err(|_| ConfigError::ValidationError {
            message: format!("unknown changelog mode '{mode}' (expected immediate or queued)"),
        })?;
    }

    Ok(())
}

/// Validate configuration values.
pub fn validate(config: &SandstockConfig) -> Result<(), ConfigError> {
    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError {
            message: "database.max_connections must be greater than 0".to_string(),
        });
    }

    if config.database.path == ":memory:" && config.database.max_connections != 1 {
        return Err(ConfigError::ValidationError {
            message: "database.max_connections must be 1 for an in-memory database".to_string(),
        });
    }

    if config.changelog.flush_interval_ms == 0 {
        return Err(ConfigError::ValidationError {
            message: "changelog.flush_interval_ms must be greater than 0".to_string(),
        });
    }

    Ok(())
}
