//! Cluster-wide advisory lock acquisition with bounded, jittered backoff.
//!
//! Multiple replicas boot against the same database at once; whichever takes
//! the advisory lock runs migrations while the rest wait. Acquisition is the
//! only operation in the coordinator that blocks with a timeout — once the
//! lock is held, migration execution runs without one.

use crate::error::{BootError, BootResult};
use chrono::{DateTime, Utc};
use gw_core::config::LockConfig;
use gw_db::Database;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Upper bound on a single backoff delay
const MAX_DELAY_MS: u64 = 2_000;

/// A held advisory lock.
///
/// Not a guard type on purpose: release is async and must run on every
/// coordinator exit path, so the coordinator calls [`BootLock::release`]
/// explicitly in its finally-equivalent tail rather than relying on Drop.
#[derive(Debug, Clone)]
pub struct BootLock {
    pub key: String,
    pub holder: String,
    pub acquired_at: DateTime<Utc>,
}

impl BootLock {
    /// Generate a holder identity unique to this process's boot attempt.
    pub fn holder_identity() -> String {
        format!("gw-{}", Uuid::new_v4())
    }

    /// Acquire the lock, retrying with exponential backoff and jitter until
    /// `config.timeout_ms` elapses.
    pub async fn acquire(
        db: &Arc<dyn Database>,
        config: &LockConfig,
        holder: String,
    ) -> BootResult<Self> {
        let deadline = Instant::now() + Duration::from_millis(config.timeout_ms);
        let mut delay_ms = config.base_delay_ms.max(1);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            if db.try_advisory_lock(&config.key, &holder).await? {
                log::debug!(
                    "Acquired advisory lock '{}' as {} (attempt {})",
                    config.key,
                    holder,
                    attempts
                );
                return Ok(Self {
                    key: config.key.clone(),
                    holder,
                    acquired_at: Utc::now(),
                });
            }

            let jitter_ms = rand::thread_rng().gen_range(0..=delay_ms / 2);
            let sleep_ms = delay_ms + jitter_ms;
            if Instant::now() + Duration::from_millis(sleep_ms) >= deadline {
                return Err(BootError::LockTimeout {
                    key: config.key.clone(),
                    timeout_ms: config.timeout_ms,
                    attempts,
                });
            }

            log::debug!(
                "Advisory lock '{}' held elsewhere; retrying in {}ms",
                config.key,
                sleep_ms
            );
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
        }
    }

    /// Release the lock.
    ///
    /// Failures are logged, never propagated: release runs on every exit
    /// path and must not shadow the run's primary outcome.
    pub async fn release(&self, db: &Arc<dyn Database>) {
        match db.advisory_unlock(&self.key, &self.holder).await {
            Ok(true) => log::debug!("Released advisory lock '{}'", self.key),
            Ok(false) => log::warn!(
                "Advisory lock '{}' was not held by {} at release",
                self.key,
                self.holder
            ),
            Err(e) => log::error!("Failed to release advisory lock '{}': {}", self.key, e),
        }
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
