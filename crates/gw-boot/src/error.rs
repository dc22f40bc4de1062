//! Error types for the bootstrap coordinator.

use crate::validator::SchemaDiff;
use gw_core::migration::EscalationTier;
use thiserror::Error;

/// Bootstrap errors.
#[derive(Error, Debug)]
pub enum BootError {
    /// Advisory lock could not be acquired within the time budget (B001).
    #[error("[B001] Could not acquire advisory lock '{key}' within {timeout_ms}ms after {attempts} attempts")]
    LockTimeout {
        key: String,
        timeout_ms: u64,
        attempts: u32,
    },

    /// Checksum drift on an already-completed migration (B002).
    ///
    /// Always fatal; never auto-resolved by re-running the SQL. Requires an
    /// operator to decide whether the file edit or the ledger row is wrong.
    #[error("[B002] Checksum drift in '{filename}': ledger has {recorded}, file is now {actual}")]
    Drift {
        filename: String,
        recorded: String,
        actual: String,
    },

    /// A migration's SQL failed (B003). Propagation depends on the tier.
    #[error("[B003] Migration '{filename}' ({tier}) failed: {message}")]
    Execution {
        filename: String,
        tier: EscalationTier,
        message: String,
    },

    /// Live schema does not match the declared expectation (B004).
    #[error("[B004] Schema validation failed: {0}")]
    Validation(SchemaDiff),

    /// Ledger bookkeeping failed (B005).
    #[error("[B005] Ledger error: {0}")]
    Ledger(String),

    /// Illegal ledger status transition (B006).
    #[error("[B006] Illegal status transition for '{filename}': {from} -> {to}")]
    IllegalTransition {
        filename: String,
        from: String,
        to: String,
    },

    /// Catalog or resolver error propagated from gw-core.
    #[error(transparent)]
    Core(#[from] gw_core::CoreError),

    /// Database error propagated from gw-db.
    #[error(transparent)]
    Db(#[from] gw_db::DbError),
}

/// Result type alias for [`BootError`].
pub type BootResult<T> = Result<T, BootError>;
