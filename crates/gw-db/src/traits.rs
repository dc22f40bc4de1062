//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction trait for Groundwork
///
/// Implementations must be Send + Sync for async operation. The bootstrap
/// coordinator drives everything through this trait: migration SQL,
/// transaction brackets, ledger bookkeeping, advisory locking, and the
/// introspection the schema validator needs.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a query returning a single optional text row.
    ///
    /// Columns are stringified; NULL becomes None. Used by the ledger for
    /// single-row lookups.
    async fn query_optional_row(&self, sql: &str, columns: usize)
        -> DbResult<Option<Vec<Option<String>>>>;

    /// Execute a query returning all rows as stringified columns
    async fn query_rows(&self, sql: &str, columns: usize) -> DbResult<Vec<Vec<Option<String>>>>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Begin a transaction
    async fn begin(&self) -> DbResult<()>;

    /// Commit the current transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the current transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Check if a table exists
    async fn table_exists(&self, name: &str) -> DbResult<bool>;

    /// Column names of a table, in ordinal order
    async fn table_columns(&self, name: &str) -> DbResult<Vec<String>>;

    /// Try to take the cluster-wide advisory lock for `key`.
    ///
    /// Returns true when acquired. Non-blocking: callers own the retry and
    /// backoff policy. Exactly one holder exists per key at any instant.
    async fn try_advisory_lock(&self, key: &str, holder: &str) -> DbResult<bool>;

    /// Release the advisory lock for `key` if `holder` owns it.
    ///
    /// Returns true when a lock was actually released. Releasing a lock held
    /// by someone else is a no-op, never an error: release runs on every
    /// coordinator exit path and must not mask the primary failure.
    async fn advisory_unlock(&self, key: &str, holder: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
