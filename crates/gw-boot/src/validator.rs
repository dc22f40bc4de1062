//! Post-migration schema validation.
//!
//! Compares the statically declared expected schema shape against live
//! catalog introspection. Reports a structured diff and never auto-fixes.

use crate::error::{BootError, BootResult};
use gw_core::config::{ValidatorConfig, ValidatorMode};
use gw_db::Database;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Structured difference between the expected shape and the live schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaDiff {
    /// Expected tables absent from the database
    pub missing_tables: Vec<String>,

    /// Expected columns absent from an existing table
    pub missing_columns: BTreeMap<String, Vec<String>>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_tables.is_empty() && self.missing_columns.is_empty()
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing_tables.is_empty() {
            parts.push(format!("missing tables: {}", self.missing_tables.join(", ")));
        }
        for (table, columns) in &self.missing_columns {
            parts.push(format!("{} missing columns: {}", table, columns.join(", ")));
        }
        if parts.is_empty() {
            write!(f, "no differences")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

/// Compare `config.expected` against the live database.
///
/// Returns the diff regardless of mode; callers decide what it means. An
/// empty expectation map validates trivially.
pub async fn introspect_diff(
    db: &Arc<dyn Database>,
    config: &ValidatorConfig,
) -> BootResult<SchemaDiff> {
    let mut diff = SchemaDiff::default();

    for (table, expected_columns) in &config.expected {
        if !db.table_exists(table).await? {
            diff.missing_tables.push(table.clone());
            continue;
        }
        let live: Vec<String> = db.table_columns(table).await?;
        let missing: Vec<String> = expected_columns
            .iter()
            .filter(|c| !live.contains(c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            diff.missing_columns.insert(table.clone(), missing);
        }
    }

    Ok(diff)
}

/// Run validation under the configured mode.
///
/// Strict mode turns a non-empty diff into [`BootError::Validation`];
/// permissive mode logs it and lets the boot proceed.
pub async fn validate(db: &Arc<dyn Database>, config: &ValidatorConfig) -> BootResult<SchemaDiff> {
    let diff = introspect_diff(db, config).await?;

    if diff.is_empty() {
        log::debug!("Schema validation passed ({} tables)", config.expected.len());
        return Ok(diff);
    }

    match config.mode {
        ValidatorMode::Strict => Err(BootError::Validation(diff)),
        ValidatorMode::Permissive => {
            log::warn!("Schema validation found differences (permissive): {}", diff);
            Ok(diff)
        }
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
