//! Migrate up: the full bootstrap run.

use anyhow::Result;
use gw_boot::Coordinator;
use std::sync::Arc;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{load_context, load_ordered_catalog, open_db, ExitCode};

/// Execute the up command
pub async fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let mut context = load_context(global)?;
    if let Some(timeout) = args.lock_timeout_ms {
        context.config.lock.timeout_ms = timeout;
    }

    let ordered = load_ordered_catalog(&context)?;
    if ordered.is_empty() {
        println!("No migrations found");
        return Ok(());
    }

    if global.verbose {
        println!("Execution order:");
        for def in &ordered {
            println!("  {} (tier {})", def.filename, def.tier);
        }
    }

    let db = open_db(&context)?;
    let coordinator = Coordinator::new(Arc::clone(&db), context.config.clone());

    println!(
        "Bootstrapping '{}' ({} migrations, lock '{}')",
        context.config.name,
        ordered.len(),
        context.config.lock.key
    );

    match coordinator.run(&ordered).await {
        Ok(report) => {
            for name in &report.applied {
                println!("  \u{2713} {} applied", name);
            }
            for name in &report.skipped {
                println!("  - {} already completed", name);
            }
            for name in &report.failed {
                println!("  \u{2717} {} failed (recorded; will retry next boot)", name);
            }
            println!(
                "Ready: {} applied, {} skipped, {} failed in {}ms",
                report.applied.len(),
                report.skipped.len(),
                report.failed.len(),
                report.duration_ms
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Bootstrap failed: {}", e);
            Err(ExitCode(1).into())
        }
    }
}
