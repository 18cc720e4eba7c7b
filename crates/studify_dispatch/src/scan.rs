// --- File: crates/studify_dispatch/src/scan.rs ---
//! The periodic scan: which reminders entered their fire window since the
//! previous scan, delivered to every active device of each due user.

use crate::error::DispatchError;
use crate::gateway::DispatchGateway;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use studify_common::models::{CourseRecurrence, Enrollment, ReminderOccurrence};
use studify_common::services::PushPayload;
use studify_db::{DeviceRegistrationRepository, SentReminderRepository};
use studify_push::deliver_to_tokens;
use studify_schedule::{fire_instant, upcoming_occurrences};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Counters from one scan tick.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScanOutcome {
    pub enrollments_considered: usize,
    /// (user, occurrence) pairs whose fire instant fell inside the window
    pub due: usize,
    /// Pairs skipped because their dedup marker already existed
    pub already_sent: usize,
    /// Pairs for which at least one device delivery succeeded
    pub reminders_sent: usize,
    pub deliveries_attempted: usize,
    pub devices_deactivated: usize,
    /// Per-user failures that were logged and skipped
    pub user_errors: usize,
}

enum DueResult {
    Sent { attempted: usize, deactivated: usize },
    AlreadySent,
    NothingDelivered { attempted: usize, deactivated: usize },
    Errored,
}

impl<R, S> DispatchGateway<R, S>
where
    R: DeviceRegistrationRepository,
    S: SentReminderRepository,
{
    /// Scan every active enrollment and deliver the reminders whose fire
    /// instant falls within `(window_start, now]`.
    ///
    /// A failure in one user's path never prevents another user's path from
    /// completing: per-user errors are logged and counted, and only the
    /// initial enrollment read can abort the scan.
    pub async fn run_scan(
        &self,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, DispatchError> {
        let scan_id = Uuid::new_v4();
        debug!(
            "Scan {} over window ({}, {}]",
            scan_id, window_start, now
        );

        let enrollments = self
            .enrollments
            .active_enrollments()
            .await
            .map_err(|e| DispatchError::ProviderError(e.to_string()))?;

        let mut outcome = ScanOutcome {
            enrollments_considered: enrollments.len(),
            ..ScanOutcome::default()
        };

        // One recurrence lookup per course, not per enrollment. A course
        // whose recurrence cannot be read is skipped for this tick.
        let mut recurrences: HashMap<String, Option<CourseRecurrence>> = HashMap::new();
        for enrollment in &enrollments {
            if recurrences.contains_key(&enrollment.course_id) {
                continue;
            }
            let recurrence = match self.enrollments.course_recurrence(&enrollment.course_id).await {
                Ok(recurrence) => recurrence,
                Err(e) => {
                    warn!(
                        "Failed to load recurrence for course {}: {}",
                        enrollment.course_id, e
                    );
                    outcome.user_errors += 1;
                    None
                }
            };
            recurrences.insert(enrollment.course_id.clone(), recurrence);
        }

        let mut due: Vec<(Enrollment, ReminderOccurrence)> = Vec::new();
        for enrollment in enrollments {
            if !enrollment.notifications_enabled {
                continue;
            }
            let Some(Some(recurrence)) = recurrences.get(&enrollment.course_id) else {
                continue;
            };

            for occurrence in
                upcoming_occurrences(recurrence, now, self.tz, self.config.horizon_days)
            {
                let Some(fire_at) = fire_instant(&occurrence, enrollment.lead_minutes) else {
                    continue;
                };
                if fire_at > window_start && fire_at <= now {
                    due.push((enrollment.clone(), occurrence));
                }
            }
        }
        outcome.due = due.len();

        // Each due pair is independent (own dedup key, own device list), so
        // they are processed by a bounded concurrent worker pool.
        let results: Vec<DueResult> = stream::iter(due)
            .map(|(enrollment, occurrence)| self.deliver_due(enrollment, occurrence))
            .buffer_unordered(self.config.scan_concurrency.max(1))
            .collect()
            .await;

        for result in results {
            match result {
                DueResult::Sent {
                    attempted,
                    deactivated,
                } => {
                    outcome.reminders_sent += 1;
                    outcome.deliveries_attempted += attempted;
                    outcome.devices_deactivated += deactivated;
                }
                DueResult::AlreadySent => outcome.already_sent += 1,
                DueResult::NothingDelivered {
                    attempted,
                    deactivated,
                } => {
                    outcome.deliveries_attempted += attempted;
                    outcome.devices_deactivated += deactivated;
                }
                DueResult::Errored => outcome.user_errors += 1,
            }
        }

        info!(
            "Scan {} complete: {} due, {} sent, {} already sent, {} deliveries, {} deactivated, {} errors",
            scan_id,
            outcome.due,
            outcome.reminders_sent,
            outcome.already_sent,
            outcome.deliveries_attempted,
            outcome.devices_deactivated,
            outcome.user_errors
        );
        Ok(outcome)
    }

    /// Deliver one due (user, occurrence) pair to every active device.
    ///
    /// The dedup marker is written only after at least one device delivery
    /// succeeded (at-least-once): a pair whose deliveries all failed stays
    /// unmarked, so a retry of the same window — an aborted tick, a manual
    /// re-scan — attempts it again instead of silently dropping it.
    async fn deliver_due(
        &self,
        enrollment: Enrollment,
        occurrence: ReminderOccurrence,
    ) -> DueResult {
        match self
            .sent
            .was_sent(
                &enrollment.user_id,
                &occurrence.course_id,
                occurrence.session_start,
            )
            .await
        {
            Ok(true) => return DueResult::AlreadySent,
            Ok(false) => {}
            Err(e) => {
                error!(
                    "Dedup check failed for user {}: {}",
                    enrollment.user_id, e
                );
                return DueResult::Errored;
            }
        }

        let devices = match self.registry.list_active(&enrollment.user_id).await {
            Ok(devices) => devices,
            Err(e) => {
                error!(
                    "Device lookup failed for user {}: {}",
                    enrollment.user_id, e
                );
                return DueResult::Errored;
            }
        };

        if devices.is_empty() {
            debug!(
                "User {} has no active devices; reminder not marked as sent",
                enrollment.user_id
            );
            return DueResult::NothingDelivered {
                attempted: 0,
                deactivated: 0,
            };
        }

        let tokens: Vec<String> = devices
            .into_iter()
            .map(|d| d.destination_token)
            .collect();
        let payload = reminder_payload(&enrollment, &occurrence, self.tz);

        let report =
            deliver_to_tokens(self.transport.as_ref(), &tokens, &payload, self.config.chunk_size)
                .await;

        let mut deactivated = 0;
        for token in &report.invalid_tokens {
            match self.registry.deactivate(token).await {
                Ok(true) => deactivated += 1,
                Ok(false) => {}
                Err(e) => warn!("Failed to deactivate dead token: {}", e),
            }
        }

        if report.any_delivered() {
            if let Err(e) = self
                .sent
                .mark_sent(
                    &enrollment.user_id,
                    &occurrence.course_id,
                    occurrence.session_start,
                )
                .await
            {
                // The reminder went out but the marker write failed; a retry
                // of this window may deliver a duplicate, which the chosen
                // at-least-once policy accepts.
                error!(
                    "Failed to record sent marker for user {}: {}",
                    enrollment.user_id, e
                );
            }
            DueResult::Sent {
                attempted: report.attempted,
                deactivated,
            }
        } else {
            warn!(
                "No delivery succeeded for user {} ({} attempted)",
                enrollment.user_id, report.attempted
            );
            DueResult::NothingDelivered {
                attempted: report.attempted,
                deactivated,
            }
        }
    }
}

/// Build the push payload for one due reminder. The notification channel is
/// resolved from the user's sound preference exactly once, here.
fn reminder_payload(
    enrollment: &Enrollment,
    occurrence: &ReminderOccurrence,
    tz: chrono_tz::Tz,
) -> PushPayload {
    let local_start = occurrence.session_start.with_timezone(&tz);
    let body = match &occurrence.venue {
        Some(venue) => format!(
            "{} starts at {} in {}",
            occurrence.course_name,
            local_start.format("%H:%M"),
            venue
        ),
        None => format!(
            "{} starts at {}",
            occurrence.course_name,
            local_start.format("%H:%M")
        ),
    };

    let mut data = HashMap::new();
    data.insert("type".to_string(), "course_reminder".to_string());
    data.insert("course_id".to_string(), occurrence.course_id.clone());
    data.insert(
        "session_start".to_string(),
        occurrence.session_start.to_rfc3339(),
    );

    PushPayload {
        title: occurrence.course_name.clone(),
        body,
        channel_id: Some(enrollment.sound.channel_id().to_string()),
        data: Some(data),
    }
}
