#[cfg(test)]
mod tests {
    use crate::gateway::DispatchGateway;
    use crate::testutil::{
        enrollment, MemoryEnrollments, MemoryRegistry, MemorySentLog, RecordingTransport,
        TokenBehavior,
    };
    use chrono::{DateTime, TimeZone, Utc, Weekday};
    use chrono_tz::Europe::Zurich;
    use std::collections::HashMap;
    use std::sync::Arc;
    use studify_common::models::CourseRecurrence;
    use studify_config::DispatchConfig;

    struct Fixture {
        registry: MemoryRegistry,
        sent: MemorySentLog,
        enrollments: MemoryEnrollments,
        transport: RecordingTransport,
        gateway: DispatchGateway<MemoryRegistry, MemorySentLog>,
    }

    fn fixture(started_at: DateTime<Utc>) -> Fixture {
        let registry = MemoryRegistry::default();
        let sent = MemorySentLog::default();
        let enrollments = MemoryEnrollments::default();
        let transport = RecordingTransport::default();

        let gateway = DispatchGateway::new(
            registry.clone(),
            sent.clone(),
            Arc::new(enrollments.clone()),
            Arc::new(transport.clone()),
            Zurich,
            DispatchConfig::default(),
            started_at,
        );

        Fixture {
            registry,
            sent,
            enrollments,
            transport,
            gateway,
        }
    }

    fn wednesday_course(course_id: &str) -> CourseRecurrence {
        CourseRecurrence {
            course_id: course_id.to_string(),
            course_name: format!("Course {}", course_id),
            days: vec![Weekday::Wed],
            default_start: "10:00".to_string(),
            default_end: "11:30".to_string(),
            per_day: HashMap::new(),
        }
    }

    fn local(h: u32, m: u32) -> DateTime<Utc> {
        // Wednesday 2025-05-07 in the course timezone
        Zurich
            .with_ymd_and_hms(2025, 5, 7, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn due_reminder_goes_to_active_devices_only_and_is_marked_sent() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);
        f.registry.add_device("dana", "tok-aaaa0002", true);
        f.registry.add_device("dana", "tok-aaaa0003", false);

        // Session at 10:00, lead 15 -> fire instant 09:45, inside (09:40, 09:46]
        let outcome = f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();

        assert_eq!(outcome.due, 1);
        assert_eq!(outcome.reminders_sent, 1);
        assert_eq!(outcome.deliveries_attempted, 2);

        let mut sent_tokens = f.transport.sent_tokens();
        sent_tokens.sort();
        assert_eq!(sent_tokens, vec!["tok-aaaa0001", "tok-aaaa0002"]);
        assert_eq!(f.sent.len(), 1);
    }

    #[tokio::test]
    async fn already_sent_pair_is_not_redelivered() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);

        f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();
        assert_eq!(f.transport.sends().len(), 1);

        // A second pass over the same window (e.g. an aborted tick being
        // retried) must hit the dedup marker.
        let outcome = f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();
        assert_eq!(outcome.already_sent, 1);
        assert_eq!(outcome.reminders_sent, 0);
        assert_eq!(f.transport.sends().len(), 1);
    }

    #[tokio::test]
    async fn fire_instant_outside_the_window_is_not_due() {
        let f = fixture(local(9, 30));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);

        // Fire instant 09:45 is after this window
        let outcome = f.gateway.run_scan(local(9, 30), local(9, 40)).await.unwrap();
        assert_eq!(outcome.due, 0);

        // And before this one
        let outcome = f.gateway.run_scan(local(9, 46), local(9, 50)).await.unwrap();
        assert_eq!(outcome.due, 0);
        assert!(f.transport.sends().is_empty());
    }

    #[tokio::test]
    async fn invalid_token_is_deactivated_and_delivery_still_counts() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);
        f.registry.add_device("dana", "tok-dead0001", true);
        f.transport.set_behavior("tok-dead0001", TokenBehavior::Invalid);

        let outcome = f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();

        assert_eq!(outcome.reminders_sent, 1);
        assert_eq!(outcome.devices_deactivated, 1);
        assert!(!f.registry.is_active("tok-dead0001"));
        assert!(f.registry.is_active("tok-aaaa0001"));

        // The dead endpoint is gone from the fan-out set of later scans.
        let listed = {
            use studify_db::DeviceRegistrationRepository;
            f.registry.list_active("dana").await.unwrap()
        };
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn pair_with_no_successful_delivery_is_not_marked_sent() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);
        f.transport
            .set_behavior("tok-aaaa0001", TokenBehavior::Unreachable);

        let outcome = f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();

        assert_eq!(outcome.reminders_sent, 0);
        assert_eq!(outcome.deliveries_attempted, 1);
        // No marker: a retry of this window may still deliver the reminder.
        assert_eq!(f.sent.len(), 0);
    }

    #[tokio::test]
    async fn disabled_notifications_and_zero_lead_are_skipped() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));

        let mut muted = enrollment("mia", "c-algo", "Mia");
        muted.notifications_enabled = false;
        f.enrollments.add_enrollment(muted);

        let mut no_lead = enrollment("noel", "c-algo", "Noel");
        no_lead.lead_minutes = 0;
        f.enrollments.add_enrollment(no_lead);

        f.registry.add_device("mia", "tok-aaaa0001", true);
        f.registry.add_device("noel", "tok-aaaa0002", true);

        let outcome = f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();
        assert_eq!(outcome.due, 0);
        assert!(f.transport.sends().is_empty());
    }

    #[tokio::test]
    async fn course_without_recurrence_is_skipped_not_fatal() {
        let f = fixture(local(9, 40));
        // c-ghost has no recurrence definition at all
        f.enrollments.add_enrollment(enrollment("dana", "c-ghost", "Dana"));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);

        let outcome = f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();

        // The ghost course contributes nothing; the healthy one still fires.
        assert_eq!(outcome.due, 1);
        assert_eq!(outcome.reminders_sent, 1);
    }

    #[tokio::test]
    async fn tick_advances_the_scan_window() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));
        f.enrollments.add_enrollment(enrollment("dana", "c-algo", "Dana"));
        f.registry.add_device("dana", "tok-aaaa0001", true);

        // First tick covers (09:40, 09:46] and delivers.
        let outcome = f.gateway.tick(local(9, 46)).await.unwrap();
        assert_eq!(outcome.reminders_sent, 1);

        // Second tick covers (09:46, 09:51]; the fire instant is behind it.
        let outcome = f.gateway.tick(local(9, 51)).await.unwrap();
        assert_eq!(outcome.due, 0);
    }

    #[tokio::test]
    async fn reminder_payload_resolves_channel_and_local_time() {
        let f = fixture(local(9, 40));
        f.enrollments.set_recurrence(wednesday_course("c-algo"));

        let mut chime = enrollment("dana", "c-algo", "Dana");
        chime.sound = studify_common::models::SoundPreference::Chime;
        f.enrollments.add_enrollment(chime);
        f.registry.add_device("dana", "tok-aaaa0001", true);

        f.gateway.run_scan(local(9, 40), local(9, 46)).await.unwrap();

        let sends = f.transport.sends();
        assert_eq!(sends.len(), 1);
        let payload = &sends[0].1;
        assert_eq!(payload.channel_id.as_deref(), Some("course_reminders_chime"));
        assert!(payload.body.contains("10:00"));
        let data = payload.data.as_ref().unwrap();
        assert_eq!(data.get("type").map(String::as_str), Some("course_reminder"));
        assert_eq!(data.get("course_id").map(String::as_str), Some("c-algo"));
    }
}
