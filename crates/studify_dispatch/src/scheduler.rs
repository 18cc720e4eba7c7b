// --- File: crates/studify_dispatch/src/scheduler.rs ---
//! Process-wide scheduler for the background jobs.
//!
//! The periodic scan and the cleanup job are explicit scheduled tasks owned
//! by this component, with a defined start/stop lifecycle — not ambient
//! background state. Tests bypass it entirely and drive the scan/cleanup
//! functions directly with an injected clock.

use crate::cleanup::CleanupJob;
use crate::gateway::DispatchGateway;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use studify_db::{DeviceRegistrationRepository, SentReminderRepository};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Owns the background job tasks. Dropping the scheduler stops them.
#[derive(Default)]
pub struct JobScheduler {
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the periodic scan loop. The first tick fires immediately, then
    /// every `interval`.
    pub fn start_scan<R, S>(&mut self, gateway: Arc<DispatchGateway<R, S>>, interval: Duration)
    where
        R: DeviceRegistrationRepository + Send + Sync + 'static,
        S: SentReminderRepository + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // An errored tick leaves the scan window unadvanced; the next
                // tick retries it in full.
                if let Err(e) = gateway.tick(Utc::now()).await {
                    error!("Dispatch scan tick failed: {}", e);
                }
            }
        });
        self.handles.push(handle);
        info!("Dispatch scan started (every {:?})", interval);
    }

    /// Start the cleanup loop: once shortly after process start, then on a
    /// fixed interval.
    pub fn start_cleanup<R>(
        &mut self,
        job: Arc<CleanupJob<R>>,
        initial_delay: Duration,
        interval: Duration,
    ) where
        R: DeviceRegistrationRepository + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(initial_delay).await;
            loop {
                if let Err(e) = job.run_once(Utc::now()).await {
                    error!("Cleanup run failed: {}", e);
                }
                tokio::time::sleep(interval).await;
            }
        });
        self.handles.push(handle);
        info!(
            "Cleanup job started (first run in {:?}, then every {:?})",
            initial_delay, interval
        );
    }

    /// Number of running background tasks.
    pub fn running_jobs(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Stop every background task.
    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Background jobs stopped");
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
