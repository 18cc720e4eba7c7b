// --- File: crates/studify_mirror/src/scheduler.rs ---
//! The local mirror scheduler.
//!
//! Keeps the device's OS notification timer queue consistent with "one future
//! reminder per future occurrence, for every enrolled course, at the user's
//! current lead time and sound preference". Runs synchronously on the
//! device's event loop; deterministic identifiers make a double-run harmless.

use crate::entry::{course_prefix, entry_identifier, ScheduledMirrorEntry};
use crate::store::{MirrorError, MirrorStore, OsTimerQueue};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::BTreeSet;
use studify_common::models::{CourseRecurrence, UserNotificationPrefs};
use studify_schedule::{fire_decision, upcoming_occurrences, ReminderDecision};
use tracing::{debug, info};

/// What caused a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    AppForeground,
    Login,
    EnrollmentChange,
    /// Every occurrence must be re-fired at the new offset, so all existing
    /// entries are cancelled up front.
    LeadTimeChange,
    /// Sound or similar preference change; rescheduling per course suffices.
    PreferenceChange,
    CourseUpdate,
    /// Resync forced by reconciliation after the OS dropped a timer.
    Reconcile,
}

/// Counters from one sync run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub cancelled: usize,
    pub scheduled: usize,
    pub swept: usize,
}

/// The per-device mirror scheduler.
pub struct MirrorScheduler<S, Q> {
    store: S,
    queue: Q,
    tz: Tz,
    horizon_days: u32,
}

impl<S: MirrorStore, Q: OsTimerQueue> MirrorScheduler<S, Q> {
    pub fn new(store: S, queue: Q, tz: Tz, horizon_days: u32) -> Self {
        Self {
            store,
            queue,
            tz,
            horizon_days,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Test/diagnostic access to the queue (e.g. to simulate OS drops).
    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// Bring the OS queue and the durable record in line with the given
    /// courses and preferences.
    ///
    /// With notifications disabled every outstanding timer is cancelled
    /// before this returns, so a user who disables reminders never receives a
    /// stray one that was already in flight.
    pub fn sync(
        &mut self,
        trigger: SyncTrigger,
        courses: &[CourseRecurrence],
        prefs: &UserNotificationPrefs,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, MirrorError> {
        let mut report = SyncReport::default();

        if !prefs.notifications_enabled {
            report.cancelled += self.cancel_everything()?;
            info!("Notifications disabled; cancelled all mirror entries");
            return Ok(report);
        }

        if trigger == SyncTrigger::LeadTimeChange {
            report.cancelled += self.cancel_everything()?;
        }

        for course in courses {
            let prefix = course_prefix(&course.course_id);
            report.cancelled += self.queue.cancel_by_prefix(&prefix)?;
            self.store.remove_by_prefix(&prefix)?;

            for occurrence in upcoming_occurrences(course, now, self.tz, self.horizon_days) {
                match fire_decision(&occurrence, prefs.lead_minutes, now) {
                    ReminderDecision::Scheduled(fire_at) => {
                        let entry = ScheduledMirrorEntry {
                            identifier: entry_identifier(
                                &occurrence.course_id,
                                occurrence.session_start,
                            ),
                            course_id: occurrence.course_id.clone(),
                            session_start: occurrence.session_start,
                            fire_at,
                        };

                        let (title, body) = self.reminder_text(&occurrence, prefs.lead_minutes);
                        self.queue.schedule(&entry, &title, &body)?;
                        self.store.insert(entry)?;
                        report.scheduled += 1;
                    }
                    ReminderDecision::Expired | ReminderDecision::Disabled => {}
                }
            }
        }

        report.swept = self.sweep(now)?;
        debug!(
            "Mirror sync ({:?}): {} scheduled, {} cancelled, {} swept",
            trigger, report.scheduled, report.cancelled, report.swept
        );
        Ok(report)
    }

    /// Drop every entry whose fire instant has already passed, from the
    /// durable record and (defensively) from the OS queue.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Result<usize, MirrorError> {
        let mut swept = 0;
        for entry in self.store.entries()? {
            if entry.fire_at <= now {
                self.store.remove(&entry.identifier)?;
                self.queue.cancel(&entry.identifier)?;
                swept += 1;
            }
        }
        Ok(swept)
    }

    /// Periodic validation pass.
    ///
    /// Compares the durable record's identifier set against what the OS
    /// reports is still queued; any expected identifier that is missing (the
    /// OS dropped it, e.g. after an update or reinstall) forces a full
    /// resync. Returns the resync report, or None when everything matched.
    pub fn reconcile(
        &mut self,
        courses: &[CourseRecurrence],
        prefs: &UserNotificationPrefs,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncReport>, MirrorError> {
        let expected: BTreeSet<String> = self
            .store
            .entries()?
            .into_iter()
            .filter(|e| e.fire_at > now)
            .map(|e| e.identifier)
            .collect();

        let pending: BTreeSet<String> = self.queue.pending_identifiers()?.into_iter().collect();

        let missing: Vec<&String> = expected.difference(&pending).collect();
        if missing.is_empty() {
            return Ok(None);
        }

        info!(
            "Mirror reconciliation found {} dropped timers; forcing resync",
            missing.len()
        );
        self.sync(SyncTrigger::Reconcile, courses, prefs, now)
            .map(Some)
    }

    fn cancel_everything(&mut self) -> Result<usize, MirrorError> {
        let cancelled = self.queue.cancel_all()?;
        self.store.clear()?;
        Ok(cancelled)
    }

    fn reminder_text(
        &self,
        occurrence: &studify_common::models::ReminderOccurrence,
        lead_minutes: i64,
    ) -> (String, String) {
        let local_start = occurrence.session_start.with_timezone(&self.tz);
        let body = match &occurrence.venue {
            Some(venue) => format!(
                "Starts at {} in {} (in {} min)",
                local_start.format("%H:%M"),
                venue,
                lead_minutes
            ),
            None => format!(
                "Starts at {} (in {} min)",
                local_start.format("%H:%M"),
                lead_minutes
            ),
        };
        (occurrence.course_name.clone(), body)
    }
}
