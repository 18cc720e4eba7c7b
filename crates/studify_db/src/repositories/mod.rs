//! Repository implementations for the Studify durable store.

pub mod device_registration;
pub mod device_registration_sql;
pub mod enrollment_sql;
pub mod sent_reminder;
pub mod sent_reminder_sql;
pub mod sms_log;
pub mod sms_log_sql;

pub use device_registration::DeviceRegistrationRepository;
pub use device_registration_sql::SqlDeviceRegistrationRepository;
pub use enrollment_sql::SqlEnrollmentRepository;
pub use sent_reminder::SentReminderRepository;
pub use sent_reminder_sql::SqlSentReminderRepository;
pub use sms_log::{SmsLogRepository, SmsSendLog};
pub use sms_log_sql::SqlSmsLogRepository;

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as fixed-width RFC3339 TEXT so that lexicographic
/// comparison in SQL matches chronological order across all Any-driver
/// backends.
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod ts_tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_round_trip() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 2, 9, 45, 0).unwrap();
        assert_eq!(parse_ts(Some(format_ts(ts))), Some(ts));
        assert_eq!(parse_ts(None), None);
        assert_eq!(parse_ts(Some("garbage".to_string())), None);
    }

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 2, 9, 45, 0).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_ts(earlier) < format_ts(later));
    }
}
