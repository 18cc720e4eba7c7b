// --- File: crates/studify_dispatch/src/cleanup.rs ---
//! Registry cleanup: reclaim device registrations that have been inactive
//! beyond the retention window.
//!
//! Strictly background maintenance. It never runs inline with request
//! handling, and its failure must not affect dispatch.

use crate::error::DispatchError;
use chrono::{DateTime, Duration, Utc};
use studify_db::DeviceRegistrationRepository;
use tracing::info;

/// The cleanup job over the device registry.
pub struct CleanupJob<R> {
    registry: R,
    retention_days: u32,
}

impl<R: DeviceRegistrationRepository> CleanupJob<R> {
    pub fn new(registry: R, retention_days: u32) -> Self {
        Self {
            registry,
            retention_days,
        }
    }

    /// Hard-delete inactive registrations untouched for longer than the
    /// retention window. Returns the count reclaimed. Active rows are never
    /// touched regardless of age.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<u64, DispatchError> {
        let cutoff = now - Duration::days(i64::from(self.retention_days));
        let reclaimed = self.registry.reclaim_stale(cutoff).await?;
        info!(
            "Cleanup reclaimed {} device registrations inactive since before {}",
            reclaimed, cutoff
        );
        Ok(reclaimed)
    }
}
