//! Migrate status: ledger vs catalog, read-only.
//!
//! Deliberately takes no advisory lock so operators can inspect a wedged or
//! mid-flight bootstrap.

use anyhow::Result;
use gw_boot::{Ledger, MigrationStatus};
use serde::Serialize;
use std::sync::Arc;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{load_context, load_ordered_catalog, open_db};

#[derive(Debug, Serialize)]
struct StatusRow {
    filename: String,
    status: String,
    checksum_ok: Option<bool>,
    executed_at: Option<String>,
    execution_time_ms: Option<i64>,
    error: Option<String>,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let context = load_context(global)?;
    let ordered = load_ordered_catalog(&context)?;

    let db = open_db(&context)?;
    let ledger = Ledger::new(Arc::clone(&db));
    ledger.ensure_table().await?;
    let mut records = ledger.read_all().await?;

    let mut rows: Vec<StatusRow> = Vec::with_capacity(ordered.len());
    for def in &ordered {
        match records.remove(&def.filename) {
            Some(record) => {
                let checksum_ok = (record.status == MigrationStatus::Completed)
                    .then(|| record.checksum == def.checksum);
                rows.push(StatusRow {
                    filename: def.filename.clone(),
                    status: record.status.to_string(),
                    checksum_ok,
                    executed_at: record.executed_at.map(|t| t.to_rfc3339()),
                    execution_time_ms: record.execution_time_ms,
                    error: record.error_message,
                });
            }
            None => rows.push(StatusRow {
                filename: def.filename.clone(),
                status: "pending".to_string(),
                checksum_ok: None,
                executed_at: None,
                execution_time_ms: None,
                error: None,
            }),
        }
    }

    // Ledger rows with no corresponding file: deleted or renamed migrations.
    for (filename, record) in records {
        rows.push(StatusRow {
            filename,
            status: format!("{} (no file)", record.status),
            checksum_ok: None,
            executed_at: record.executed_at.map(|t| t.to_rfc3339()),
            execution_time_ms: record.execution_time_ms,
            error: record.error_message,
        });
    }

    match args.output {
        StatusOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        StatusOutput::Table => {
            println!("{:<32} {:<18} {:<8} {}", "MIGRATION", "STATUS", "DRIFT", "TIME");
            for row in &rows {
                let drift = match row.checksum_ok {
                    Some(true) => "ok",
                    Some(false) => "DRIFT",
                    None => "-",
                };
                let time = row
                    .execution_time_ms
                    .map(|ms| format!("{}ms", ms))
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<32} {:<18} {:<8} {}", row.filename, row.status, drift, time);
                if let Some(error) = &row.error {
                    println!("{:<32} error: {}", "", error);
                }
            }
        }
    }

    Ok(())
}
