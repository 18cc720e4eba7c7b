// --- File: crates/studify_schedule/src/reminder.rs ---
//! Reminder rule: when, if ever, a reminder for an occurrence should fire.

use chrono::{DateTime, Duration, Utc};
use studify_common::models::ReminderOccurrence;

/// The reminder rule's verdict for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderDecision {
    /// Fire at this instant (strictly in the future).
    Scheduled(DateTime<Utc>),
    /// The fire instant has already passed; callers must never schedule a
    /// reminder in the past.
    Expired,
    /// Lead time of zero or less means "no reminders", not "fire immediately".
    Disabled,
}

/// The raw fire instant for an occurrence, or None when reminders are
/// disabled for this user.
///
/// The dispatch scan needs the instant itself (to test membership in its
/// scan window) even when that instant is already in the past, so this is
/// split out from [`fire_decision`].
pub fn fire_instant(occurrence: &ReminderOccurrence, lead_minutes: i64) -> Option<DateTime<Utc>> {
    if lead_minutes <= 0 {
        return None;
    }
    Some(occurrence.session_start - Duration::minutes(lead_minutes))
}

/// Applies the reminder rule relative to `now`.
pub fn fire_decision(
    occurrence: &ReminderOccurrence,
    lead_minutes: i64,
    now: DateTime<Utc>,
) -> ReminderDecision {
    match fire_instant(occurrence, lead_minutes) {
        None => ReminderDecision::Disabled,
        Some(fire_at) if fire_at <= now => ReminderDecision::Expired,
        Some(fire_at) => ReminderDecision::Scheduled(fire_at),
    }
}
