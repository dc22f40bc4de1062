//! Bootstrap coordinator: the state machine that takes a database from
//! unknown state to `Ready`.
//!
//! Phases: `Init -> AcquiringLock -> ValidatingLedger -> Applying ->
//! ValidatingSchema -> Ready`, with `Failed` reachable from any non-terminal
//! phase. Every phase change is published on a watch channel so downstream
//! collaborators (seeding, HTTP serve) can wait for readiness, and so a
//! health endpoint can answer "not ready" while migrations are in flight.

use crate::error::{BootError, BootResult};
use crate::ledger::{Ledger, MigrationStatus};
use crate::lock::BootLock;
use crate::validator;
use gw_core::config::Config;
use gw_core::migration::MigrationDefinition;
use gw_db::Database;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Coordinator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootPhase {
    Init,
    AcquiringLock,
    ValidatingLedger,
    Applying,
    ValidatingSchema,
    Ready,
    Failed,
}

impl BootPhase {
    pub fn is_ready(self) -> bool {
        self == BootPhase::Ready
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BootPhase::Ready | BootPhase::Failed)
    }

    /// Health-check contract for an external orchestrator: traffic may only
    /// be routed once migrations and validation are done.
    pub fn health(self) -> &'static str {
        if self.is_ready() {
            "ready"
        } else {
            "not ready"
        }
    }
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BootPhase::Init => "init",
            BootPhase::AcquiringLock => "acquiring_lock",
            BootPhase::ValidatingLedger => "validating_ledger",
            BootPhase::Applying => "applying",
            BootPhase::ValidatingSchema => "validating_schema",
            BootPhase::Ready => "ready",
            BootPhase::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Summary of one coordinator run.
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub phase: BootPhase,
    /// Migrations executed by this run
    pub applied: Vec<String>,
    /// Migrations already completed with matching checksums
    pub skipped: Vec<String>,
    /// Migrations that failed but did not abort the run (non-strict tiers)
    pub failed: Vec<String>,
    pub duration_ms: u64,
}

/// The per-run bootstrap coordinator.
///
/// Constructed fresh for each boot attempt; all state flows through this
/// object rather than process-wide globals, so runs are isolated and unit
/// testable.
pub struct Coordinator {
    db: Arc<dyn Database>,
    config: Config,
    phase_tx: watch::Sender<BootPhase>,
}

impl Coordinator {
    pub fn new(db: Arc<dyn Database>, config: Config) -> Self {
        let (phase_tx, _) = watch::channel(BootPhase::Init);
        Self {
            db,
            config,
            phase_tx,
        }
    }

    /// Subscribe to phase changes. The readiness signal downstream
    /// collaborators consume: wait until the value is `Ready` (or `Failed`).
    pub fn subscribe(&self) -> watch::Receiver<BootPhase> {
        self.phase_tx.subscribe()
    }

    /// Current phase.
    pub fn phase(&self) -> BootPhase {
        *self.phase_tx.borrow()
    }

    /// Run the full bootstrap over migrations already placed in resolver
    /// order (catalog -> resolver -> here).
    ///
    /// The advisory lock is released on every exit path before this method
    /// returns; a failure mid-migration never wedges later boot attempts.
    pub async fn run(&self, ordered: &[MigrationDefinition]) -> BootResult<BootReport> {
        let start = Instant::now();

        self.set_phase(BootPhase::AcquiringLock);
        let lock = match BootLock::acquire(
            &self.db,
            &self.config.lock,
            BootLock::holder_identity(),
        )
        .await
        {
            Ok(lock) => lock,
            Err(e) => {
                self.set_phase(BootPhase::Failed);
                return Err(e);
            }
        };

        let result = self.run_locked(ordered, start).await;

        // Finally-equivalent: unconditional release before reporting.
        lock.release(&self.db).await;

        match result {
            Ok(mut report) => {
                self.set_phase(BootPhase::Ready);
                report.phase = BootPhase::Ready;
                report.duration_ms = start.elapsed().as_millis() as u64;
                log::debug!(
                    "Bootstrap ready: {} applied, {} skipped, {} failed in {}ms",
                    report.applied.len(),
                    report.skipped.len(),
                    report.failed.len(),
                    report.duration_ms
                );
                Ok(report)
            }
            Err(e) => {
                self.set_phase(BootPhase::Failed);
                Err(e)
            }
        }
    }

    async fn run_locked(
        &self,
        ordered: &[MigrationDefinition],
        start: Instant,
    ) -> BootResult<BootReport> {
        let mut report = BootReport {
            phase: BootPhase::Applying,
            applied: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
        };

        // Re-read the ledger under the lock: peers may have completed
        // migrations while this instance waited.
        self.set_phase(BootPhase::ValidatingLedger);
        let ledger = Ledger::new(Arc::clone(&self.db));
        ledger.ensure_table().await?;
        let records = ledger.read_all().await?;

        self.set_phase(BootPhase::Applying);
        for def in ordered {
            if let Some(record) = records.get(&def.filename) {
                if record.status == MigrationStatus::Completed {
                    if record.checksum == def.checksum {
                        log::debug!("{}: already completed, skipping", def.filename);
                        report.skipped.push(def.filename.clone());
                        continue;
                    }
                    return Err(BootError::Drift {
                        filename: def.filename.clone(),
                        recorded: record.checksum.clone(),
                        actual: def.checksum.clone(),
                    });
                }
                log::debug!(
                    "{}: ledger shows '{}', re-running",
                    def.filename,
                    record.status
                );
            }

            self.apply_one(&ledger, def, &mut report).await?;
        }

        self.set_phase(BootPhase::ValidatingSchema);
        validator::validate(&self.db, &self.config.validator).await?;

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Execute one migration inside its own transaction.
    ///
    /// A later file's failure never rolls back an earlier file's committed
    /// success; there is deliberately no all-encompassing run transaction.
    async fn apply_one(
        &self,
        ledger: &Ledger,
        def: &MigrationDefinition,
        report: &mut BootReport,
    ) -> BootResult<()> {
        ledger.mark_running(&def.filename, &def.checksum).await?;

        let migration_start = Instant::now();
        self.db.begin().await?;

        match self.db.execute_batch(&def.sql_body).await {
            Ok(()) => {
                self.db.commit().await?;
                let elapsed_ms = migration_start.elapsed().as_millis() as i64;
                ledger
                    .mark_completed(&def.filename, &def.checksum, elapsed_ms)
                    .await?;
                log::debug!("{}: applied in {}ms", def.filename, elapsed_ms);
                report.applied.push(def.filename.clone());
                Ok(())
            }
            Err(sql_err) => {
                if let Err(rb_err) = self.db.rollback().await {
                    log::error!("{}: rollback failed: {}", def.filename, rb_err);
                }
                let message = sql_err.to_string();
                ledger.mark_failed(&def.filename, &message).await?;

                if def.tier.aborts_run() {
                    return Err(BootError::Execution {
                        filename: def.filename.clone(),
                        tier: def.tier,
                        message,
                    });
                }

                log::warn!(
                    "{} ({}) failed, continuing: {}",
                    def.filename,
                    def.tier,
                    message
                );
                report.failed.push(def.filename.clone());
                Ok(())
            }
        }
    }

    fn set_phase(&self, phase: BootPhase) {
        log::debug!("Bootstrap phase: {}", phase);
        self.phase_tx.send_replace(phase);
    }
}

/// Wait for a coordinator to reach a terminal phase.
///
/// Returns true on `Ready`, false on `Failed` (or a dropped coordinator).
/// This is the boolean readiness future consumed by seeding and service
/// init: they must not start until it resolves true.
pub async fn await_ready(rx: &mut watch::Receiver<BootPhase>) -> bool {
    loop {
        let phase = *rx.borrow();
        if phase.is_terminal() {
            return phase.is_ready();
        }
        if rx.changed().await.is_err() {
            return false;
        }
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
