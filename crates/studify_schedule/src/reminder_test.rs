#[cfg(test)]
mod tests {
    use crate::reminder::{fire_decision, fire_instant, ReminderDecision};
    use chrono::{Duration, TimeZone, Utc};
    use studify_common::models::ReminderOccurrence;

    fn occurrence_at(session_start: chrono::DateTime<Utc>) -> ReminderOccurrence {
        ReminderOccurrence {
            course_id: "c-algo".to_string(),
            course_name: "Algorithms".to_string(),
            session_start,
            venue: None,
        }
    }

    #[test]
    fn lead_time_of_zero_or_less_disables_reminders() {
        let start = Utc.with_ymd_and_hms(2025, 5, 7, 10, 0, 0).unwrap();
        let now = start - Duration::hours(1);
        let occurrence = occurrence_at(start);

        assert_eq!(fire_instant(&occurrence, 0), None);
        assert_eq!(fire_instant(&occurrence, -30), None);
        assert_eq!(
            fire_decision(&occurrence, 0, now),
            ReminderDecision::Disabled
        );
        assert_eq!(
            fire_decision(&occurrence, -30, now),
            ReminderDecision::Disabled
        );
    }

    #[test]
    fn fire_instant_inside_the_lead_window_is_expired() {
        // Wednesday 09:50, session at 10:00, lead 15 minutes: the reminder
        // should have fired at 09:45, which is already past.
        let start = Utc.with_ymd_and_hms(2025, 5, 7, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 9, 50, 0).unwrap();
        let occurrence = occurrence_at(start);

        assert_eq!(
            fire_instant(&occurrence, 15),
            Some(Utc.with_ymd_and_hms(2025, 5, 7, 9, 45, 0).unwrap())
        );
        assert_eq!(
            fire_decision(&occurrence, 15, now),
            ReminderDecision::Expired
        );
    }

    #[test]
    fn fire_instant_exactly_now_counts_as_expired() {
        let start = Utc.with_ymd_and_hms(2025, 5, 7, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 5, 7, 9, 45, 0).unwrap();
        let occurrence = occurrence_at(start);

        assert_eq!(
            fire_decision(&occurrence, 15, now),
            ReminderDecision::Expired
        );
    }

    #[test]
    fn future_fire_instant_is_scheduled() {
        // Tuesday 09:00 looking at Wednesday 10:00 with a 15 minute lead.
        let start = Utc.with_ymd_and_hms(2025, 5, 7, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 9, 0, 0).unwrap();
        let occurrence = occurrence_at(start);

        let expected_fire = Utc.with_ymd_and_hms(2025, 5, 7, 9, 45, 0).unwrap();
        assert_eq!(
            fire_decision(&occurrence, 15, now),
            ReminderDecision::Scheduled(expected_fire)
        );
    }
}
