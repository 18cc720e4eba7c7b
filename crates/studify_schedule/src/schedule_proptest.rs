#[cfg(test)]
mod proptests {
    use crate::occurrence::upcoming_occurrences;
    use crate::reminder::{fire_decision, ReminderDecision};
    use chrono::{Datelike, Duration, TimeZone, Utc, Weekday};
    use chrono_tz::Europe::Zurich;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use studify_common::models::CourseRecurrence;

    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn recurrence_strategy() -> impl Strategy<Value = CourseRecurrence> {
        (
            proptest::collection::vec(0usize..7, 0..7),
            0u32..24,
            0u32..60,
        )
            .prop_map(|(day_indices, hour, minute)| {
                let mut days: Vec<Weekday> =
                    day_indices.into_iter().map(|i| ALL_WEEKDAYS[i]).collect();
                days.dedup();
                CourseRecurrence {
                    course_id: "c-prop".to_string(),
                    course_name: "Property Testing".to_string(),
                    days,
                    default_start: format!("{:02}:{:02}", hour, minute),
                    default_end: format!("{:02}:{:02}", hour, minute),
                    per_day: HashMap::new(),
                }
            })
    }

    proptest! {
        #[test]
        fn occurrences_are_strictly_increasing_and_on_member_days(
            recurrence in recurrence_strategy(),
            day_offset in 0i64..365,
            horizon in 1u32..15,
        ) {
            let now = Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap()
                + Duration::days(day_offset);

            let occurrences = upcoming_occurrences(&recurrence, now, Zurich, horizon);

            for pair in occurrences.windows(2) {
                prop_assert!(pair[0].session_start < pair[1].session_start);
            }
            for occurrence in &occurrences {
                prop_assert!(occurrence.session_start > now);
                let local_day = occurrence.session_start.with_timezone(&Zurich).date_naive();
                prop_assert!(recurrence.days.contains(&local_day.weekday()));
            }
        }

        #[test]
        fn reminder_rule_never_schedules_in_the_past(
            recurrence in recurrence_strategy(),
            lead_minutes in -120i64..4320,
        ) {
            let now = Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap();
            let occurrences = upcoming_occurrences(&recurrence, now, Zurich, 7);

            for occurrence in &occurrences {
                match fire_decision(occurrence, lead_minutes, now) {
                    ReminderDecision::Scheduled(fire_at) => {
                        prop_assert!(lead_minutes > 0);
                        prop_assert!(fire_at > now);
                    }
                    ReminderDecision::Expired => prop_assert!(lead_minutes > 0),
                    ReminderDecision::Disabled => prop_assert!(lead_minutes <= 0),
                }
            }
        }
    }
}
