//! Append-only log of text-message sends.
//!
//! The weekly rate limiter is a pure count over this log; rows are never
//! mutated or deleted.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded text-message send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsSendLog {
    pub id: Option<i64>,
    pub user_id: String,
    pub phone_number: String,
    pub message: String,
    /// Message category, e.g. "course_reminder" or "verification"
    pub kind: String,
    pub course_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl SmsSendLog {
    pub fn new(user_id: String, phone_number: String, message: String, kind: String) -> Self {
        Self {
            id: None,
            user_id,
            phone_number,
            message,
            kind,
            course_id: None,
            sent_at: Utc::now(),
        }
    }
}

/// Repository for the SMS send log.
pub trait SmsLogRepository {
    /// Create the log table if it does not already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Append one send record.
    fn record(
        &self,
        entry: SmsSendLog,
    ) -> impl std::future::Future<Output = Result<SmsSendLog, DbError>> + Send;

    /// Number of sends recorded for a user at or after `since`.
    fn count_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<i64, DbError>> + Send;
}
