//! Configuration types and parsing for groundwork.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main project configuration from groundwork.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory containing migration SQL files, relative to the config file
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Advisory lock settings
    #[serde(default)]
    pub lock: LockConfig,

    /// Post-migration schema validation settings
    #[serde(default)]
    pub validator: ValidatorConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(default, rename = "type")]
    pub db_type: DbType,

    /// Path to database file (or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

/// Supported database types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    #[default]
    Duckdb,
}

/// Advisory lock settings.
///
/// The key must never vary across deployments of the same logical service;
/// every replica has to contend for the same lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    /// Cluster-wide lock key shared by all instances
    #[serde(default = "default_lock_key")]
    pub key: String,

    /// Total time budget for lock acquisition, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,

    /// Initial backoff delay between acquisition attempts, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            key: default_lock_key(),
            timeout_ms: default_lock_timeout_ms(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Validator strictness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorMode {
    /// A schema diff blocks readiness
    #[default]
    Strict,
    /// A schema diff is logged; readiness still granted
    Permissive,
}

/// Post-migration schema validation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Validation mode
    #[serde(default)]
    pub mode: ValidatorMode,

    /// Expected schema shape: table name -> expected columns.
    ///
    /// Declared statically; migrations never mutate this at runtime.
    #[serde(default)]
    pub expected: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string (tests, embedded defaults).
    pub fn from_yaml(contents: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the migrations directory to an absolute path against the
    /// project root (the directory holding groundwork.yml).
    ///
    /// Never resolved against the process cwd: cwd differs between local
    /// runs and containerized deployments, and a wrong-but-existing relative
    /// directory silently loads zero migrations.
    pub fn migrations_dir(&self, project_root: &Path) -> PathBuf {
        let p = Path::new(&self.migrations_path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            project_root.join(p)
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "project name must not be empty".to_string(),
            });
        }
        if self.lock.key.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "lock.key must not be empty".to_string(),
            });
        }
        if self.lock.timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "lock.timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    "groundwork.duckdb".to_string()
}

fn default_lock_key() -> String {
    "groundwork_bootstrap".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    30_000
}

fn default_base_delay_ms() -> u64 {
    100
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
