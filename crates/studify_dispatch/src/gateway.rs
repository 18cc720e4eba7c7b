// --- File: crates/studify_dispatch/src/gateway.rs ---
//! The dispatch gateway: shared state for the periodic scan, the broadcast
//! entry point, and the diagnostics report.

use crate::error::DispatchError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use studify_common::services::{EnrollmentProvider, PushTransport};
use studify_config::{AppConfig, DispatchConfig};
use studify_db::{
    DbClient, DeviceRegistrationRepository, SentReminderRepository,
    SqlDeviceRegistrationRepository, SqlEnrollmentRepository, SqlSentReminderRepository,
};
use studify_push::PushClient;
use tokio::sync::Mutex;

/// Central dispatcher over the device registry, the sent-reminder dedup log,
/// the external enrollment view, and the push transport.
pub struct DispatchGateway<R, S> {
    pub(crate) registry: R,
    pub(crate) sent: S,
    pub(crate) enrollments: Arc<dyn EnrollmentProvider>,
    pub(crate) transport: Arc<dyn PushTransport>,
    pub(crate) tz: Tz,
    pub(crate) config: DispatchConfig,
    /// End of the previous scan window. Guarded by an async mutex so that an
    /// overlapping manual trigger and timer tick serialize instead of
    /// double-scanning the same window.
    last_scan: Mutex<DateTime<Utc>>,
}

/// The production gateway wired to the SQL repositories.
pub type SqlDispatchGateway =
    DispatchGateway<SqlDeviceRegistrationRepository, SqlSentReminderRepository>;

impl<R, S> DispatchGateway<R, S>
where
    R: DeviceRegistrationRepository,
    S: SentReminderRepository,
{
    pub fn new(
        registry: R,
        sent: S,
        enrollments: Arc<dyn EnrollmentProvider>,
        transport: Arc<dyn PushTransport>,
        tz: Tz,
        config: DispatchConfig,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            registry,
            sent,
            enrollments,
            transport,
            tz,
            config,
            last_scan: Mutex::new(started_at),
        }
    }

    /// One scheduler tick: scan the window since the previous successful
    /// scan. The window only advances when the scan completes, so a tick that
    /// fails at the store/provider level is retried in full on the next tick.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<crate::scan::ScanOutcome, DispatchError> {
        let mut window_start = self.last_scan.lock().await;
        let outcome = self.run_scan(*window_start, now).await?;
        *window_start = now;
        Ok(outcome)
    }
}

/// Build the production gateway from the application configuration.
pub fn build_gateway(
    config: &Arc<AppConfig>,
    db_client: DbClient,
) -> Result<Arc<SqlDispatchGateway>, DispatchError> {
    let tz: Tz = config
        .timezone
        .parse()
        .map_err(|_| DispatchError::ConfigError(format!("Invalid timezone: {}", config.timezone)))?;

    let dispatch_config = config.dispatch.clone().unwrap_or_default();
    let push_config = config.push.clone().unwrap_or_default();

    let registry = SqlDeviceRegistrationRepository::new(db_client.clone());
    let sent = SqlSentReminderRepository::new(db_client.clone());
    let enrollments: Arc<dyn EnrollmentProvider> =
        Arc::new(SqlEnrollmentRepository::new(db_client));
    let transport: Arc<dyn PushTransport> = Arc::new(PushClient::new(push_config));

    Ok(Arc::new(DispatchGateway::new(
        registry,
        sent,
        enrollments,
        transport,
        tz,
        dispatch_config,
        Utc::now(),
    )))
}
