// --- File: crates/studify_sms/src/limiter.rs ---
//! Weekly quota for the secondary text-message channel.
//!
//! The quota is a pure count over the append-only send log: `weekly_count`
//! counts rows at or after the most recent Monday 00:00 local, and a send is
//! refused — before any transport call and before any log row is written —
//! once the count reaches the limit. Push volume is not considered.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use studify_common::services::{NotificationResult, SmsTransport};
use studify_db::{DbError, SmsLogRepository, SmsSendLog};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the quota-aware send path.
#[derive(Error, Debug)]
pub enum SmsSendError {
    /// The weekly quota is used up; nothing was sent and nothing was logged
    #[error("Weekly SMS quota exceeded: {used} of {limit} used")]
    QuotaExceeded { used: i64, limit: i64 },

    /// The transport rejected or failed the send
    #[error("SMS transport error: {0}")]
    TransportError(String),

    /// Error from the send log store
    #[error("Database error: {0}")]
    DbError(#[from] DbError),
}

/// The instant the current quota week began: the most recent Monday 00:00 in
/// the given timezone.
pub fn week_start(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let monday =
        local.date_naive() - Duration::days(i64::from(local.weekday().num_days_from_monday()));
    let midnight = monday.and_hms_opt(0, 0, 0).unwrap();

    // earliest() resolves a DST fold; a DST gap at midnight falls forward to
    // the first valid local instant of that Monday.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Pure quota predicate.
pub fn has_exceeded(weekly_count: i64, limit: i64) -> bool {
    weekly_count >= limit
}

/// Quota-aware SMS sender: every send through the secondary channel goes
/// through here.
pub struct LimitedSmsSender<L> {
    log: L,
    transport: Arc<dyn SmsTransport>,
    tz: Tz,
    limit: i64,
}

impl<L: SmsLogRepository> LimitedSmsSender<L> {
    pub fn new(log: L, transport: Arc<dyn SmsTransport>, tz: Tz, limit: i64) -> Self {
        Self {
            log,
            transport,
            tz,
            limit,
        }
    }

    /// Number of sends recorded for the user since the current week began.
    pub async fn weekly_count(&self, user_id: &str, now: DateTime<Utc>) -> Result<i64, DbError> {
        self.log.count_since(user_id, week_start(now, self.tz)).await
    }

    /// Send one message unless the user's weekly quota is used up.
    ///
    /// On refusal no transport call is made and no log row is written. On a
    /// successful transport call the send is appended to the log so it counts
    /// against the rest of the week.
    pub async fn send_limited(
        &self,
        user_id: &str,
        phone_number: &str,
        message: &str,
        kind: &str,
        course_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<NotificationResult, SmsSendError> {
        let used = self.weekly_count(user_id, now).await?;
        if has_exceeded(used, self.limit) {
            warn!(
                "Refusing SMS for user {}: weekly quota {}/{} used",
                user_id, used, self.limit
            );
            return Err(SmsSendError::QuotaExceeded {
                used,
                limit: self.limit,
            });
        }

        let result = self
            .transport
            .send_sms(phone_number, message)
            .await
            .map_err(|e| SmsSendError::TransportError(e.to_string()))?;

        let mut entry = SmsSendLog::new(
            user_id.to_string(),
            phone_number.to_string(),
            message.to_string(),
            kind.to_string(),
        );
        entry.course_id = course_id;
        entry.sent_at = now;
        self.log.record(entry).await?;

        info!(
            "SMS sent for user {} ({} of {} this week)",
            user_id,
            used + 1,
            self.limit
        );
        Ok(result)
    }
}
