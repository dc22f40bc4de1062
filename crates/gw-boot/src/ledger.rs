//! Migration ledger: the persistent record of what has run.
//!
//! The ledger is the single source of truth for skip-vs-run decisions. The
//! filesystem only says which migrations exist; only the ledger says what has
//! actually executed against this database's history. All writes happen
//! inside the lock-holding coordinator, so rows never race.

use crate::error::{BootError, BootResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use gw_db::{quote_literal, Database};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Ledger table name
pub const LEDGER_TABLE: &str = "gw_migrations";

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS gw_migrations (
    filename          VARCHAR PRIMARY KEY,
    checksum          VARCHAR NOT NULL,
    status            VARCHAR NOT NULL,
    executed_at       TIMESTAMP,
    execution_time_ms BIGINT,
    error_message     VARCHAR
)";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Execution status of one migration row.
///
/// Transitions only move forward: `pending -> running -> completed|failed`.
/// A `failed` row moves back to `running` when a later boot retries it, and
/// a stale `running` row (a prior holder crashed mid-flight) may be taken
/// over by the current lock holder. `completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl MigrationStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MigrationStatus::Pending),
            "running" => Some(MigrationStatus::Running),
            "completed" => Some(MigrationStatus::Completed),
            "failed" => Some(MigrationStatus::Failed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal forward transition.
    pub fn can_transition(self, to: MigrationStatus) -> bool {
        use MigrationStatus::*;
        matches!(
            (self, to),
            (Pending, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Failed, Running)
                // Crash recovery: a new lock holder re-runs a wedged row.
                | (Running, Running)
        )
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Pending => write!(f, "pending"),
            MigrationStatus::Running => write!(f, "running"),
            MigrationStatus::Completed => write!(f, "completed"),
            MigrationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One ledger row.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRecord {
    pub filename: String,
    pub checksum: String,
    pub status: MigrationStatus,
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_time_ms: Option<i64>,
    pub error_message: Option<String>,
}

/// Ledger access over the shared [`Database`] handle.
pub struct Ledger {
    db: Arc<dyn Database>,
}

impl Ledger {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Create the ledger table if it does not exist.
    pub async fn ensure_table(&self) -> BootResult<()> {
        self.db.execute_batch(LEDGER_DDL).await?;
        Ok(())
    }

    /// Read every ledger row, keyed by filename.
    pub async fn read_all(&self) -> BootResult<BTreeMap<String, MigrationRecord>> {
        let sql = "SELECT filename, checksum, status, \
                   CAST(executed_at AS VARCHAR), \
                   CAST(execution_time_ms AS VARCHAR), \
                   error_message \
                   FROM gw_migrations ORDER BY filename";
        let rows = self.db.query_rows(sql, 6).await?;

        let mut records = BTreeMap::new();
        for row in rows {
            let record = parse_row(&row)?;
            records.insert(record.filename.clone(), record);
        }
        Ok(records)
    }

    /// Read one ledger row.
    pub async fn get(&self, filename: &str) -> BootResult<Option<MigrationRecord>> {
        let sql = format!(
            "SELECT filename, checksum, status, \
             CAST(executed_at AS VARCHAR), \
             CAST(execution_time_ms AS VARCHAR), \
             error_message \
             FROM gw_migrations WHERE filename = {}",
            quote_literal(filename)
        );
        match self.db.query_optional_row(&sql, 6).await? {
            Some(row) => Ok(Some(parse_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Mark a migration as running, creating the row on first sight.
    ///
    /// Rejects the transition if the row is already `completed` — once
    /// completed, a row is never reopened.
    pub async fn mark_running(&self, filename: &str, checksum: &str) -> BootResult<()> {
        if let Some(existing) = self.get(filename).await? {
            if !existing.status.can_transition(MigrationStatus::Running) {
                return Err(BootError::IllegalTransition {
                    filename: filename.to_string(),
                    from: existing.status.to_string(),
                    to: MigrationStatus::Running.to_string(),
                });
            }
            if existing.status == MigrationStatus::Running {
                log::warn!(
                    "{}: found stale 'running' row from a crashed boot; retrying",
                    filename
                );
            }
        }

        let sql = format!(
            "INSERT INTO gw_migrations (filename, checksum, status, executed_at) \
             VALUES ({}, {}, 'running', {}) \
             ON CONFLICT (filename) DO UPDATE SET \
             status = 'running', checksum = {}, executed_at = {}, error_message = NULL",
            quote_literal(filename),
            quote_literal(checksum),
            now_literal(),
            quote_literal(checksum),
            now_literal(),
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    /// Record a successful execution with its timing.
    ///
    /// The checksum written here is immutable from this point on; any later
    /// mismatch is drift, surfaced by the coordinator, never patched here.
    pub async fn mark_completed(
        &self,
        filename: &str,
        checksum: &str,
        execution_time_ms: i64,
    ) -> BootResult<()> {
        self.guard_transition(filename, MigrationStatus::Completed).await?;
        let sql = format!(
            "UPDATE gw_migrations SET status = 'completed', checksum = {}, \
             executed_at = {}, execution_time_ms = {}, error_message = NULL \
             WHERE filename = {}",
            quote_literal(checksum),
            now_literal(),
            execution_time_ms,
            quote_literal(filename),
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    /// Record a failed execution with the database's error text.
    pub async fn mark_failed(&self, filename: &str, error: &str) -> BootResult<()> {
        self.guard_transition(filename, MigrationStatus::Failed).await?;
        let sql = format!(
            "UPDATE gw_migrations SET status = 'failed', executed_at = {}, \
             error_message = {} WHERE filename = {}",
            now_literal(),
            quote_literal(error),
            quote_literal(filename),
        );
        self.db.execute(&sql).await?;
        Ok(())
    }

    async fn guard_transition(&self, filename: &str, to: MigrationStatus) -> BootResult<()> {
        let Some(existing) = self.get(filename).await? else {
            return Err(BootError::Ledger(format!(
                "no ledger row for '{}' (mark_running must come first)",
                filename
            )));
        };
        if !existing.status.can_transition(to) {
            return Err(BootError::IllegalTransition {
                filename: filename.to_string(),
                from: existing.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

fn now_literal() -> String {
    format!("'{}'", Utc::now().format(TIMESTAMP_FORMAT))
}

fn parse_row(row: &[Option<String>]) -> BootResult<MigrationRecord> {
    let field = |i: usize| -> BootResult<&str> {
        row.get(i)
            .and_then(|v| v.as_deref())
            .ok_or_else(|| BootError::Ledger(format!("NULL in required ledger column {}", i)))
    };

    let status_str = field(2)?;
    let status = MigrationStatus::parse(status_str)
        .ok_or_else(|| BootError::Ledger(format!("unknown ledger status '{}'", status_str)))?;

    let executed_at = match row.get(3).and_then(|v| v.as_deref()) {
        Some(ts) => Some(parse_timestamp(ts)?),
        None => None,
    };

    let execution_time_ms = match row.get(4).and_then(|v| v.as_deref()) {
        Some(ms) => Some(ms.parse::<i64>().map_err(|_| {
            BootError::Ledger(format!("bad execution_time_ms in ledger: '{}'", ms))
        })?),
        None => None,
    };

    Ok(MigrationRecord {
        filename: field(0)?.to_string(),
        checksum: field(1)?.to_string(),
        status,
        executed_at,
        execution_time_ms,
        error_message: row.get(5).and_then(|v| v.clone()),
    })
}

fn parse_timestamp(ts: &str) -> BootResult<DateTime<Utc>> {
    // DuckDB prints timestamps with a variable number of fractional digits.
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(ts, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(BootError::Ledger(format!("bad timestamp in ledger: '{}'", ts)))
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
