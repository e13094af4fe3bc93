//! Configuration types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandstockConfig {
    pub database: DatabaseConfig,
    pub changelog: ChangelogConfig,
    pub log: LogSettings,
}

/// SQLite settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, or `:memory:`.
    pub path: String,
    pub max_connections: u32,
    pub wal_mode: bool,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "sandstock.db".to_string(),
            max_connections: 5,
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

/// How captured change logs are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChangelogMode {
    /// In the same transaction as the mutation.
    #[default]
    Immediate,
    /// Queued and written by a background flush.
    Queued,
}

/// Change capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    pub mode: ChangelogMode,
    /// Maximum time a queued change log waits before being flushed.
    pub flush_interval_ms: u64,
    /// Queue depth that triggers an early flush.
    pub flush_threshold: usize,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            mode: ChangelogMode::Immediate,
            flush_interval_ms: 1000,
            flush_threshold: 100,
        }
    }
}

/// Logging settings; environment variables take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
