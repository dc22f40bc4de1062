//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::sql_utils::quote_literal;
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Bookkeeping table backing the advisory-lock emulation.
///
/// DuckDB has no native advisory locks, so mutual exclusion rides on the
/// primary key: the insert that wins owns the lock, the insert that
/// conflicts does not. Engines with native advisory locks implement the
/// trait methods directly and never create this table.
const LOCK_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS gw_advisory_lock (
    lock_key    VARCHAR PRIMARY KEY,
    holder      VARCHAR NOT NULL,
    acquired_at TIMESTAMP NOT NULL DEFAULT now()
)";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", e, path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Create a second backend over the same database instance with its own
    /// connection, hence its own transaction context.
    ///
    /// DuckDB holds a file lock per database instance, so concurrent
    /// replicas simulated in one process must clone rather than re-open.
    pub fn try_clone(&self) -> DbResult<Self> {
        let conn = self.lock_conn()?;
        let cloned = conn
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(cloned),
        })
    }

    fn lock_conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock_conn()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, truncate_sql(sql))))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, truncate_sql(sql))))
    }

    fn query_rows_sync(&self, sql: &str, columns: usize) -> DbResult<Vec<Vec<Option<String>>>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        let mut result = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DbError::ExecutionError(e.to_string()))?
        {
            let mut cols = Vec::with_capacity(columns);
            for i in 0..columns {
                let value: Option<String> = row
                    .get(i)
                    .map_err(|e| DbError::ExecutionError(e.to_string()))?;
                cols.push(value);
            }
            result.push(cols);
        }
        Ok(result)
    }

    fn ensure_lock_table(&self) -> DbResult<()> {
        self.execute_batch_sync(LOCK_TABLE_DDL)
    }
}

/// Trim SQL for error messages so a giant migration body doesn't flood logs
fn truncate_sql(sql: &str) -> String {
    const MAX: usize = 200;
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > MAX {
        format!("{}...", flat.chars().take(MAX).collect::<String>())
    } else {
        flat
    }
}

/// Whether a DuckDB error message indicates a primary-key conflict.
///
/// duckdb::Error does not expose structured variants, so string matching is
/// the only reliable approach; the patterns are kept narrow.
fn is_conflict(msg: &str) -> bool {
    msg.contains("Constraint Error")
        || msg.contains("Duplicate key")
        || msg.contains("PRIMARY KEY or UNIQUE constraint")
        // Two connections racing on the same key surface as a transaction
        // conflict rather than a constraint violation.
        || msg.contains("write-write conflict")
        || msg.contains("TransactionContext Error")
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_optional_row(
        &self,
        sql: &str,
        columns: usize,
    ) -> DbResult<Option<Vec<Option<String>>>> {
        Ok(self.query_rows_sync(sql, columns)?.into_iter().next())
    }

    async fn query_rows(&self, sql: &str, columns: usize) -> DbResult<Vec<Vec<Option<String>>>> {
        self.query_rows_sync(sql, columns)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    async fn begin(&self) -> DbResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))
    }

    async fn commit(&self) -> DbResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))
    }

    async fn rollback(&self) -> DbResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }

    async fn table_exists(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock_conn()?;

        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = {} AND table_name = {}",
            quote_literal(schema),
            quote_literal(table)
        );

        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count > 0)
    }

    async fn table_columns(&self, name: &str) -> DbResult<Vec<String>> {
        let conn = self.lock_conn()?;

        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let sql = format!(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = {} AND table_name = {} \
             ORDER BY ordinal_position",
            quote_literal(schema),
            quote_literal(table)
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DbError::ExecutionError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(columns)
    }

    async fn try_advisory_lock(&self, key: &str, holder: &str) -> DbResult<bool> {
        // Concurrent first-time creation can itself conflict across
        // connections; treat that as "not acquired" and let the caller retry.
        if let Err(e) = self.ensure_lock_table() {
            let msg = e.to_string();
            if is_conflict(&msg) {
                return Ok(false);
            }
            return Err(DbError::LockError(msg));
        }
        let sql = format!(
            "INSERT INTO gw_advisory_lock (lock_key, holder) VALUES ({}, {})",
            quote_literal(key),
            quote_literal(holder)
        );
        match self.execute_sync(&sql) {
            Ok(_) => Ok(true),
            Err(DbError::ExecutionError(msg)) if is_conflict(&msg) => Ok(false),
            Err(e) => Err(DbError::LockError(e.to_string())),
        }
    }

    async fn advisory_unlock(&self, key: &str, holder: &str) -> DbResult<bool> {
        self.ensure_lock_table()?;
        let sql = format!(
            "DELETE FROM gw_advisory_lock WHERE lock_key = {} AND holder = {}",
            quote_literal(key),
            quote_literal(holder)
        );
        let deleted = self
            .execute_sync(&sql)
            .map_err(|e| DbError::LockError(e.to_string()))?;
        Ok(deleted > 0)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
