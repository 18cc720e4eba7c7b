#[cfg(test)]
mod tests {
    use crate::entry::entry_identifier;
    use crate::scheduler::{MirrorScheduler, SyncTrigger};
    use crate::store::{MemoryMirrorStore, MemoryTimerQueue, MirrorStore, OsTimerQueue};
    use chrono::{TimeZone, Utc, Weekday};
    use chrono_tz::Europe::Zurich;
    use std::collections::{BTreeSet, HashMap};
    use studify_common::models::{
        CourseRecurrence, SessionOverride, SoundPreference, UserNotificationPrefs,
    };

    fn course(course_id: &str, days: Vec<Weekday>, start: &str) -> CourseRecurrence {
        CourseRecurrence {
            course_id: course_id.to_string(),
            course_name: format!("Course {}", course_id),
            days,
            default_start: start.to_string(),
            default_end: "23:00".to_string(),
            per_day: HashMap::new(),
        }
    }

    fn prefs(lead_minutes: i64) -> UserNotificationPrefs {
        UserNotificationPrefs {
            notifications_enabled: true,
            lead_minutes,
            sound: SoundPreference::Default,
        }
    }

    fn scheduler() -> MirrorScheduler<MemoryMirrorStore, MemoryTimerQueue> {
        MirrorScheduler::new(MemoryMirrorStore::new(), MemoryTimerQueue::new(), Zurich, 7)
    }

    fn identifiers(
        scheduler: &MirrorScheduler<MemoryMirrorStore, MemoryTimerQueue>,
    ) -> BTreeSet<String> {
        scheduler
            .store()
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.identifier)
            .collect()
    }

    // Sunday 2025-05-04 20:00 local; courses on Mon/Wed fall inside the
    // 7-day horizon.
    fn now() -> chrono::DateTime<Utc> {
        Zurich
            .with_ymd_and_hms(2025, 5, 4, 20, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn sync_schedules_one_timer_per_future_occurrence() {
        let mut scheduler = scheduler();
        let courses = vec![
            course("algo", vec![Weekday::Mon, Weekday::Wed], "10:00"),
            course("db", vec![Weekday::Tue], "14:00"),
        ];

        let report = scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();

        assert_eq!(report.scheduled, 3);
        assert_eq!(scheduler.queue().pending_identifiers().unwrap().len(), 3);
        assert_eq!(identifiers(&scheduler).len(), 3);
    }

    #[test]
    fn sync_is_idempotent_for_unchanged_state() {
        let mut scheduler = scheduler();
        let courses = vec![course("algo", vec![Weekday::Mon, Weekday::Wed], "10:00")];

        scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();
        let first = identifiers(&scheduler);

        scheduler
            .sync(SyncTrigger::AppForeground, &courses, &prefs(30), now())
            .unwrap();
        let second = identifiers(&scheduler);

        assert_eq!(first, second);
        assert_eq!(
            scheduler.queue().pending_identifiers().unwrap().len(),
            first.len()
        );
    }

    #[test]
    fn disabling_notifications_cancels_everything_synchronously() {
        let mut scheduler = scheduler();
        let courses = vec![course("algo", vec![Weekday::Mon, Weekday::Wed], "10:00")];

        scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();
        assert!(!identifiers(&scheduler).is_empty());

        let disabled = UserNotificationPrefs {
            notifications_enabled: false,
            lead_minutes: 30,
            sound: SoundPreference::Default,
        };
        let report = scheduler
            .sync(SyncTrigger::PreferenceChange, &courses, &disabled, now())
            .unwrap();

        assert_eq!(report.scheduled, 0);
        assert!(report.cancelled > 0);
        assert!(identifiers(&scheduler).is_empty());
        assert!(scheduler.queue().pending_identifiers().unwrap().is_empty());
    }

    #[test]
    fn lead_time_change_refires_every_occurrence_at_the_new_offset() {
        let mut scheduler = scheduler();
        let courses = vec![course("algo", vec![Weekday::Mon], "10:00")];

        scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();
        let before = scheduler.store().entries().unwrap();
        assert_eq!(before.len(), 1);

        scheduler
            .sync(SyncTrigger::LeadTimeChange, &courses, &prefs(60), now())
            .unwrap();
        let after = scheduler.store().entries().unwrap();
        assert_eq!(after.len(), 1);

        // The identifier is a function of (course, session start) and does
        // not move; the fire instant does.
        assert_eq!(before[0].identifier, after[0].identifier);
        assert_eq!(
            before[0].fire_at - after[0].fire_at,
            chrono::Duration::minutes(30)
        );
    }

    #[test]
    fn expired_fire_instants_are_not_scheduled() {
        let mut scheduler = scheduler();
        // Wednesday 09:50 local; session at 10:00 with lead 15 is already
        // inside the lead window.
        let wednesday_0950 = Zurich
            .with_ymd_and_hms(2025, 5, 7, 9, 50, 0)
            .unwrap()
            .with_timezone(&Utc);
        let courses = vec![course("algo", vec![Weekday::Wed], "10:00")];

        let report = scheduler
            .sync(SyncTrigger::AppForeground, &courses, &prefs(15), wednesday_0950)
            .unwrap();

        assert_eq!(report.scheduled, 0);
        assert!(identifiers(&scheduler).is_empty());
    }

    #[test]
    fn zero_lead_minutes_schedules_nothing() {
        let mut scheduler = scheduler();
        let courses = vec![course("algo", vec![Weekday::Mon, Weekday::Wed], "10:00")];

        let report = scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(0), now())
            .unwrap();

        assert_eq!(report.scheduled, 0);
    }

    #[test]
    fn course_update_replaces_that_courses_entries_only() {
        let mut scheduler = scheduler();
        let mut courses = vec![
            course("algo", vec![Weekday::Mon], "10:00"),
            course("db", vec![Weekday::Tue], "14:00"),
        ];
        scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();
        let db_ids_before: BTreeSet<String> = identifiers(&scheduler)
            .into_iter()
            .filter(|i| i.starts_with("course-db-"))
            .collect();

        // The algo course moves to Wednesday with a per-day override.
        courses[0] = CourseRecurrence {
            per_day: HashMap::from([(
                Weekday::Wed,
                SessionOverride {
                    start: "16:00".to_string(),
                    end: "17:30".to_string(),
                    venue: None,
                },
            )]),
            days: vec![Weekday::Wed],
            ..course("algo", vec![Weekday::Wed], "10:00")
        };
        scheduler
            .sync(SyncTrigger::CourseUpdate, &courses, &prefs(30), now())
            .unwrap();

        let ids = identifiers(&scheduler);
        let algo_start = Zurich
            .with_ymd_and_hms(2025, 5, 7, 16, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert!(ids.contains(&entry_identifier("algo", algo_start)));

        let db_ids_after: BTreeSet<String> = ids
            .into_iter()
            .filter(|i| i.starts_with("course-db-"))
            .collect();
        assert_eq!(db_ids_before, db_ids_after);
    }

    #[test]
    fn reconcile_resyncs_when_the_os_dropped_a_timer() {
        let mut scheduler = scheduler();
        let courses = vec![course("algo", vec![Weekday::Mon, Weekday::Wed], "10:00")];
        scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();

        // Everything matches: no resync.
        assert!(scheduler
            .reconcile(&courses, &prefs(30), now())
            .unwrap()
            .is_none());

        // The OS silently drops one timer (e.g. after an app update).
        let dropped = scheduler.queue().pending_identifiers().unwrap()[0].clone();
        scheduler.queue_mut().forget(&dropped);

        let report = scheduler
            .reconcile(&courses, &prefs(30), now())
            .unwrap()
            .expect("a dropped timer must force a resync");
        assert_eq!(report.scheduled, 2);
        assert_eq!(scheduler.queue().pending_identifiers().unwrap().len(), 2);
    }

    #[test]
    fn sweep_drops_entries_whose_fire_instant_passed() {
        let mut scheduler = scheduler();
        let courses = vec![course("algo", vec![Weekday::Mon], "10:00")];
        scheduler
            .sync(SyncTrigger::Login, &courses, &prefs(30), now())
            .unwrap();
        assert_eq!(identifiers(&scheduler).len(), 1);

        // A week later the recorded fire instant is long past.
        let much_later = now() + chrono::Duration::days(8);
        let swept = scheduler.sweep(much_later).unwrap();

        assert_eq!(swept, 1);
        assert!(identifiers(&scheduler).is_empty());
        assert!(scheduler.queue().pending_identifiers().unwrap().is_empty());
    }
}
