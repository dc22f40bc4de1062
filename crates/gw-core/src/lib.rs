//! gw-core - Core library for Groundwork
//!
//! This crate provides configuration parsing, the migration catalog, the
//! dependency resolver, and the shared types used across all Groundwork
//! components. It never touches the database.

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
pub mod migration;
pub mod resolver;

pub use checksum::{compute_checksum, normalize_sql};
pub use config::{Config, DatabaseConfig, DbType, LockConfig, ValidatorConfig, ValidatorMode};
pub use error::{CoreError, CoreResult};
pub use migration::{EscalationTier, MigrationDefinition};
pub use resolver::MigrationDag;
