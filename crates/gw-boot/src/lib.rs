//! gw-boot - Bootstrap coordination for Groundwork
//!
//! This crate owns the hard part: bringing a shared database to a known,
//! versioned schema state exactly once, no matter how many replicas boot at
//! the same time. It provides the migration ledger, advisory lock
//! acquisition, the coordinator state machine, and post-migration schema
//! validation.

pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod lock;
pub mod validator;

pub use coordinator::{await_ready, BootPhase, BootReport, Coordinator};
pub use error::{BootError, BootResult};
pub use ledger::{Ledger, MigrationRecord, MigrationStatus};
pub use lock::BootLock;
pub use validator::{introspect_diff, validate, SchemaDiff};
