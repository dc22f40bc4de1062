//! gw-db - Database abstraction layer for Groundwork
//!
//! Provides the [`Database`] trait the bootstrap coordinator drives, plus
//! the DuckDB implementation (including the table-backed advisory-lock
//! emulation).

pub mod duckdb;
pub mod error;
pub mod sql_utils;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use sql_utils::quote_literal;
pub use traits::Database;
