//! Error types for gw-core

use thiserror::Error;

/// Core error type for Groundwork
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Migrations directory missing or unreadable
    #[error("[C004] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// C005: Migration filename does not match `NNNN_slug.sql`
    #[error("[C005] Invalid migration filename '{filename}': {reason}")]
    InvalidMigrationFilename { filename: String, reason: String },

    /// C006: Two migration files share the same sequence number
    #[error("[C006] Duplicate migration sequence {sequence:04}: '{first}' and '{second}'")]
    DuplicateSequence {
        sequence: u32,
        first: String,
        second: String,
    },

    /// C007: Dependency cycle between migrations
    #[error("[C007] Circular migration dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// C008: Migration file is not valid UTF-8
    #[error("[C008] Migration '{filename}' is not valid UTF-8")]
    NotUtf8 { filename: String },

    /// C009: Invalid escalation tier annotation
    #[error("[C009] Invalid on-failure tier '{value}' in '{filename}' (expected strict, best_effort, or retry_next_boot)")]
    InvalidTier { filename: String, value: String },

    /// C010: IO error
    #[error("[C010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C011: IO error with file path context
    #[error("[C011] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C012: Schema/YAML parse error
    #[error("[C012] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
