//! In-memory collaborators for gateway tests: registry, dedup log,
//! enrollment view, and a recording push transport.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use studify_common::models::{
    CourseRecurrence, DeviceRegistration, Enrollment, Platform, SoundPreference,
};
use studify_common::services::{
    BoxFuture, BoxedError, EnrollmentProvider, PushDeliveryError, PushPayload, PushTransport,
};
use studify_db::{DbError, DeviceRegistrationRepository, SentReminderRepository};

#[derive(Clone, Default)]
pub(crate) struct MemoryRegistry {
    rows: Arc<Mutex<Vec<DeviceRegistration>>>,
}

impl MemoryRegistry {
    pub fn add_device(&self, user_id: &str, token: &str, is_active: bool) {
        self.add_device_updated_at(user_id, token, is_active, Utc::now());
    }

    pub fn add_device_updated_at(
        &self,
        user_id: &str,
        token: &str,
        is_active: bool,
        updated_at: DateTime<Utc>,
    ) {
        let mut registration = DeviceRegistration::new(
            user_id.to_string(),
            token.to_string(),
            Platform::Android,
        );
        registration.is_active = is_active;
        registration.updated_at = Some(updated_at);
        self.rows.lock().unwrap().push(registration);
    }

    pub fn is_active(&self, token: &str) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.destination_token == token && r.is_active)
    }

    pub fn token_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn owner_of(&self, token: &str) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.destination_token == token)
            .map(|r| r.user_id.clone())
    }
}

impl DeviceRegistrationRepository for MemoryRegistry {
    async fn init_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn register(
        &self,
        registration: DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter_mut()
            .find(|r| r.destination_token == registration.destination_token)
        {
            existing.user_id = registration.user_id.clone();
            existing.platform = registration.platform;
            existing.is_active = true;
            existing.updated_at = Some(Utc::now());
            return Ok(existing.clone());
        }
        rows.push(registration.clone());
        Ok(registration)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<DeviceRegistration>, DbError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.destination_token == token)
            .cloned())
    }

    async fn list_active(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, DbError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate(&self, token: &str) -> Result<bool, DbError> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|r| r.destination_token == token && r.is_active)
        {
            Some(row) => {
                row.is_active = false;
                row.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_all(&self, user_id: &str) -> Result<u64, DbError> {
        let mut rows = self.rows.lock().unwrap();
        let mut count = 0;
        for row in rows.iter_mut().filter(|r| r.user_id == user_id && r.is_active) {
            row.is_active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn reclaim_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.is_active || r.updated_at.map(|ts| ts >= cutoff).unwrap_or(true));
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemorySentLog {
    sent: Arc<Mutex<HashSet<(String, String, DateTime<Utc>)>>>,
}

impl MemorySentLog {
    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl SentReminderRepository for MemorySentLog {
    async fn init_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn was_sent(
        &self,
        user_id: &str,
        course_id: &str,
        session_start: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        Ok(self.sent.lock().unwrap().contains(&(
            user_id.to_string(),
            course_id.to_string(),
            session_start,
        )))
    }

    async fn mark_sent(
        &self,
        user_id: &str,
        course_id: &str,
        session_start: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.sent.lock().unwrap().insert((
            user_id.to_string(),
            course_id.to_string(),
            session_start,
        ));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryEnrollments {
    enrollments: Arc<Mutex<Vec<Enrollment>>>,
    recurrences: Arc<Mutex<HashMap<String, CourseRecurrence>>>,
}

impl MemoryEnrollments {
    pub fn add_enrollment(&self, enrollment: Enrollment) {
        self.enrollments.lock().unwrap().push(enrollment);
    }

    pub fn set_recurrence(&self, recurrence: CourseRecurrence) {
        self.recurrences
            .lock()
            .unwrap()
            .insert(recurrence.course_id.clone(), recurrence);
    }
}

impl EnrollmentProvider for MemoryEnrollments {
    fn active_enrollments(&self) -> BoxFuture<'_, Vec<Enrollment>, BoxedError> {
        let rows: Vec<Enrollment> = self
            .enrollments
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect();
        Box::pin(async move { Ok(rows) })
    }

    fn course_recurrence(
        &self,
        course_id: &str,
    ) -> BoxFuture<'_, Option<CourseRecurrence>, BoxedError> {
        let recurrence = self.recurrences.lock().unwrap().get(course_id).cloned();
        Box::pin(async move { Ok(recurrence) })
    }

    fn course_enrollees(&self, course_id: &str) -> BoxFuture<'_, Vec<Enrollment>, BoxedError> {
        let rows: Vec<Enrollment> = self
            .enrollments
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.course_id == course_id && e.is_active)
            .cloned()
            .collect();
        Box::pin(async move { Ok(rows) })
    }
}

/// How the recording transport treats one destination token.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenBehavior {
    Deliver,
    Invalid,
    Unreachable,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    behaviors: Arc<Mutex<HashMap<String, TokenBehavior>>>,
    sends: Arc<Mutex<Vec<(String, PushPayload)>>>,
}

impl RecordingTransport {
    pub fn set_behavior(&self, token: &str, behavior: TokenBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(token.to_string(), behavior);
    }

    pub fn sends(&self) -> Vec<(String, PushPayload)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn sent_tokens(&self) -> Vec<String> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .map(|(token, _)| token.clone())
            .collect()
    }
}

impl PushTransport for RecordingTransport {
    fn send_to_token(
        &self,
        token: &str,
        payload: &PushPayload,
    ) -> BoxFuture<'_, String, PushDeliveryError> {
        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(token)
            .copied()
            .unwrap_or(TokenBehavior::Deliver);
        let token = token.to_string();
        let payload = payload.clone();

        Box::pin(async move {
            match behavior {
                TokenBehavior::Deliver => {
                    self.sends.lock().unwrap().push((token.clone(), payload));
                    Ok(format!("msg-{}", token))
                }
                TokenBehavior::Invalid => Err(PushDeliveryError::InvalidToken(token)),
                TokenBehavior::Unreachable => {
                    Err(PushDeliveryError::Transport("unreachable".to_string()))
                }
            }
        })
    }
}

/// A plain enrollment row with sane defaults for tests.
pub(crate) fn enrollment(user_id: &str, course_id: &str, display_name: &str) -> Enrollment {
    Enrollment {
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        course_name: format!("Course {}", course_id),
        display_name: display_name.to_string(),
        phone_number: None,
        is_active: true,
        notifications_enabled: true,
        lead_minutes: 15,
        sound: SoundPreference::Default,
        legacy_token: None,
    }
}
