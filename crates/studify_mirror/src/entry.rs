// --- File: crates/studify_mirror/src/entry.rs ---
//! Mirror bookkeeping entries and their deterministic identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deterministic identifier for the (course, session start) pair.
///
/// Identifier collisions are intentional dedup keys: the same pair always
/// produces the same identifier, so re-scheduling is an overwrite rather than
/// a duplicate.
pub fn entry_identifier(course_id: &str, session_start: DateTime<Utc>) -> String {
    format!("course-{}-{}", course_id, session_start.timestamp())
}

/// Prefix matching every identifier belonging to one course.
pub fn course_prefix(course_id: &str) -> String {
    format!("course-{}-", course_id)
}

/// Durable client-local record of one reminder handed to the device's own
/// OS-level timer. Owned exclusively by the device it was created on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMirrorEntry {
    pub identifier: String,
    pub course_id: String,
    pub session_start: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
}
