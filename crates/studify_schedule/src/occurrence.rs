// --- File: crates/studify_schedule/src/occurrence.rs ---
//! Occurrence calculator: recurrence definition + horizon -> concrete future
//! session start instants.
//!
//! Pure, no I/O, and total over its domain: a malformed time string or a
//! local time skipped by a DST transition yields no occurrence for that day
//! rather than an error, so one bad course can never block another course's
//! reminders.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use studify_common::models::{CourseRecurrence, ReminderOccurrence};

/// Default scan horizon in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Parse a session time of day. Accepts "HH:MM" and "HH:MM:SS".
pub fn parse_session_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Computes every session occurrence within `horizon_days` of `now`.
///
/// For each day offset 0..H-1 the weekday of (now + offset) is tested for
/// membership in the recurrence's day set; matching days resolve their start
/// time and venue from the per-day override with fallback to the defaults.
/// Only instants strictly after `now` are emitted. Offsets are iterated
/// ascending and each weekday maps to one instant inside the window, so the
/// result is naturally in ascending chronological order.
pub fn upcoming_occurrences(
    recurrence: &CourseRecurrence,
    now: DateTime<Utc>,
    tz: Tz,
    horizon_days: u32,
) -> Vec<ReminderOccurrence> {
    let today = now.with_timezone(&tz).date_naive();
    let mut occurrences = Vec::new();

    for offset in 0..i64::from(horizon_days) {
        let date = today + Duration::days(offset);
        let weekday = date.weekday();
        if !recurrence.days.contains(&weekday) {
            continue;
        }

        let (start_raw, venue) = recurrence.resolve_day(weekday);
        let Some(start_time) = parse_session_time(start_raw) else {
            continue;
        };

        // earliest() picks the first valid instant for ambiguous local times
        // (DST fold) and is None inside a DST gap.
        let Some(local_start) = tz.from_local_datetime(&date.and_time(start_time)).earliest()
        else {
            continue;
        };

        let session_start = local_start.with_timezone(&Utc);
        if session_start > now {
            occurrences.push(ReminderOccurrence {
                course_id: recurrence.course_id.clone(),
                course_name: recurrence.course_name.clone(),
                session_start,
                venue: venue.map(str::to_string),
            });
        }
    }

    occurrences
}
