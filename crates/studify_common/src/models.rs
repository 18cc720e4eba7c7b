// --- File: crates/studify_common/src/models.rs ---

// Data structures shared across the Studify crates: the device registry row,
// the read-only course recurrence view, and the enrollment/preference models
// consumed by the dispatch gateway and the local mirror scheduler.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The mobile platform a device registration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ios" => Some(Platform::Ios),
            "android" => Some(Platform::Android),
            _ => None,
        }
    }
}

/// A push-capable endpoint owned by a user.
///
/// The `destination_token` is globally unique: registering a token that is
/// already owned by another user *claims* it for the new registrant, because
/// the token follows the physical device rather than the account that last
/// logged in from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegistration {
    /// The unique identifier for this registration
    pub id: Option<i64>,

    /// The user currently owning this registration
    pub user_id: String,

    /// Opaque transport-level address for the device's notification channel
    pub destination_token: String,

    pub platform: Platform,

    /// Client-reported device identifier, if the app supplied one
    pub device_id: Option<String>,

    /// Client-reported app version, if the app supplied one
    pub app_version: Option<String>,

    /// Soft-delete flag; inactive rows are kept for diagnostics until the
    /// cleanup job reclaims them
    pub is_active: bool,

    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeviceRegistration {
    pub fn new(user_id: String, destination_token: String, platform: Platform) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            destination_token,
            platform,
            device_id: None,
            app_version: None,
            is_active: true,
            last_used_at: Some(now),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// A user's notification sound preference.
///
/// Resolved exactly once per delivery into a transport-level channel id via
/// [`SoundPreference::channel_id`]; nothing else in the codebase derives a
/// channel from a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundPreference {
    #[default]
    Default,
    Chime,
    Silent,
}

impl SoundPreference {
    /// Maps the preference to the Android notification channel the client app
    /// registers on install.
    pub fn channel_id(&self) -> &'static str {
        match self {
            SoundPreference::Default => "course_reminders",
            SoundPreference::Chime => "course_reminders_chime",
            SoundPreference::Silent => "course_reminders_silent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "default" => Some(SoundPreference::Default),
            "chime" => Some(SoundPreference::Chime),
            "silent" => Some(SoundPreference::Silent),
            _ => None,
        }
    }
}

/// Per-day override of a course's default session times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOverride {
    /// "HH:MM"
    pub start: String,
    /// "HH:MM"
    pub end: String,
    pub venue: Option<String>,
}

/// Read-only weekly recurrence view supplied by the course/enrollment store.
///
/// Days without an entry in `per_day` fall back to `default_start` /
/// `default_end`.
#[derive(Debug, Clone)]
pub struct CourseRecurrence {
    pub course_id: String,
    pub course_name: String,
    pub days: Vec<Weekday>,
    /// "HH:MM"
    pub default_start: String,
    /// "HH:MM"
    pub default_end: String,
    pub per_day: HashMap<Weekday, SessionOverride>,
}

impl CourseRecurrence {
    /// Resolves the session start time and venue for one weekday, falling back
    /// to the defaults when no override exists for that day.
    pub fn resolve_day(&self, weekday: Weekday) -> (&str, Option<&str>) {
        match self.per_day.get(&weekday) {
            Some(override_entry) => (
                override_entry.start.as_str(),
                override_entry.venue.as_deref(),
            ),
            None => (self.default_start.as_str(), None),
        }
    }
}

/// One concrete future instance of a recurring course session.
///
/// Ephemeral: computed on demand, never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderOccurrence {
    pub course_id: String,
    pub course_name: String,
    pub session_start: DateTime<Utc>,
    pub venue: Option<String>,
}

/// A user's notification preferences as the local mirror scheduler sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotificationPrefs {
    pub notifications_enabled: bool,
    /// Minutes before session start; zero or negative disables reminders
    pub lead_minutes: i64,
    pub sound: SoundPreference,
}

/// One active enrollment row joined with the enrollee's notification
/// preferences, as supplied by the course/enrollment store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: String,
    pub course_id: String,
    pub course_name: String,
    pub display_name: String,
    pub phone_number: Option<String>,

    /// Whether the enrollment still grants access to the course
    pub is_active: bool,

    pub notifications_enabled: bool,

    /// Minutes before session start at which a reminder should fire;
    /// zero or negative disables reminders for this user entirely
    pub lead_minutes: i64,

    pub sound: SoundPreference,

    /// Single pre-registry push token some profiles still carry; surfaced in
    /// diagnostics only, never used for delivery
    pub legacy_token: Option<String>,
}
