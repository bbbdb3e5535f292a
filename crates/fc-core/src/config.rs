//! Configuration types and parsing for forecourt.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::{default_busy_timeout_ms, default_db_path};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path value that selects an in-memory store.
pub const MEMORY_PATH: &str = ":memory:";

/// Main project configuration from forecourt.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Deployment name (shown in CLI output)
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// SQLite journal mode applied when the store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Write-ahead log (default)
    #[default]
    Wal,
    /// Rollback journal, deleted after each transaction
    Delete,
    /// Rollback journal, truncated after each transaction
    Truncate,
    /// Rollback journal kept in memory
    Memory,
}

impl JournalMode {
    /// Value for `PRAGMA journal_mode = ...`.
    pub fn pragma_value(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pragma_value().to_ascii_lowercase())
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file path, relative to the project directory, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Journal mode for file-backed stores
    #[serde(default)]
    pub journal_mode: JournalMode,

    /// How long a blocked statement waits for a lock before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            journal_mode: JournalMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Whether this configuration selects an in-memory store.
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}

impl Config {
    /// Build a configuration with default database settings.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: DatabaseConfig::default(),
        }
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for forecourt.yml or forecourt.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("forecourt.yml");
        let yaml_path = dir.join("forecourt.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Serialize back to YAML (used when scaffolding a new deployment).
    pub fn to_yaml(&self) -> CoreResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Deployment name cannot be empty".to_string(),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.database.busy_timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "database.busy_timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the database path against the project root.
    ///
    /// Returns `None` for in-memory stores.
    pub fn database_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        if self.database.is_memory() {
            return None;
        }
        let path = Path::new(&self.database.path);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(root.join(path))
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
