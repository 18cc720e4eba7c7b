//! Dedup record of dispatched reminders.
//!
//! One row per (user, course, session start) marks that the periodic scan has
//! already delivered that reminder; the scan consults this before fanning out
//! so a crash or an overlapping tick never produces a redelivery storm.

use crate::error::DbError;
use chrono::{DateTime, Utc};

/// Repository for the sent-reminder dedup keys.
pub trait SentReminderRepository {
    /// Create the dedup table if it does not already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Whether this (user, course, session start) reminder was already
    /// dispatched.
    fn was_sent(
        &self,
        user_id: &str,
        course_id: &str,
        session_start: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Record the reminder as dispatched. Idempotent on the unique triple:
    /// marking an already-marked pair is a successful no-op.
    fn mark_sent(
        &self,
        user_id: &str,
        course_id: &str,
        session_start: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;
}
