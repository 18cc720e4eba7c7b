//! SQL adapter for the external course/enrollment store.
//!
//! Course editing is owned elsewhere; the core only reads this view.
//! The recurrence definition is stored as a JSON document with weekday-name
//! keys and is parsed here into the typed [`CourseRecurrence`] model; rows the
//! external system writes with unknown weekday names degrade to "no session on
//! that day" instead of failing the whole read.

use crate::error::DbError;
use crate::DbClient;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use std::collections::HashMap;
use studify_common::models::{CourseRecurrence, Enrollment, SessionOverride, SoundPreference};
use studify_common::services::{BoxFuture, BoxedError, EnrollmentProvider};
use tracing::{debug, error, warn};

/// Wire shape of a stored recurrence definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    pub days: Vec<String>,
    /// "HH:MM"
    pub default_start: String,
    /// "HH:MM"
    pub default_end: String,
    #[serde(default)]
    pub per_day: HashMap<String, OverrideSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideSpec {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub venue: Option<String>,
}

impl RecurrenceSpec {
    fn into_recurrence(self, course_id: String, course_name: String) -> CourseRecurrence {
        let mut days = Vec::with_capacity(self.days.len());
        for name in &self.days {
            match name.parse() {
                Ok(weekday) => days.push(weekday),
                Err(_) => warn!("Ignoring unknown weekday name in recurrence: {}", name),
            }
        }

        let mut per_day = HashMap::new();
        for (name, spec) in self.per_day {
            match name.parse() {
                Ok(weekday) => {
                    per_day.insert(
                        weekday,
                        SessionOverride {
                            start: spec.start,
                            end: spec.end,
                            venue: spec.venue,
                        },
                    );
                }
                Err(_) => warn!("Ignoring override for unknown weekday name: {}", name),
            }
        }

        CourseRecurrence {
            course_id,
            course_name,
            days,
            default_start: self.default_start,
            default_end: self.default_end,
            per_day,
        }
    }
}

/// SQL implementation of the read-only enrollment view.
#[derive(Debug, Clone)]
pub struct SqlEnrollmentRepository {
    db_client: DbClient,
}

impl SqlEnrollmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the enrollment/recurrence tables if they do not already exist.
    ///
    /// The external course system owns writes to these tables in production;
    /// the schema init exists for operational bootstrap and tests.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing enrollment schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS enrollments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                course_id TEXT NOT NULL,
                course_name TEXT NOT NULL,
                display_name TEXT NOT NULL,
                phone_number TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                notifications_enabled INTEGER NOT NULL DEFAULT 1,
                lead_minutes INTEGER NOT NULL DEFAULT 30,
                sound TEXT NOT NULL DEFAULT 'default',
                legacy_token TEXT,
                UNIQUE(user_id, course_id)
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS course_recurrences (
                course_id TEXT PRIMARY KEY,
                course_name TEXT NOT NULL,
                spec TEXT NOT NULL
            )
        "#,
            )
            .await?;

        Ok(())
    }

    /// Upsert one enrollment row (bootstrap/tests only).
    pub async fn upsert_enrollment(&self, enrollment: &Enrollment) -> Result<(), DbError> {
        let delete = r#"DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2"#;
        sqlx::query(delete)
            .bind(&enrollment.user_id)
            .bind(&enrollment.course_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let insert = r#"
            INSERT INTO enrollments
                (user_id, course_id, course_name, display_name, phone_number,
                 is_active, notifications_enabled, lead_minutes, sound, legacy_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#;
        sqlx::query(insert)
            .bind(&enrollment.user_id)
            .bind(&enrollment.course_id)
            .bind(&enrollment.course_name)
            .bind(&enrollment.display_name)
            .bind(&enrollment.phone_number)
            .bind(if enrollment.is_active { 1_i64 } else { 0_i64 })
            .bind(if enrollment.notifications_enabled {
                1_i64
            } else {
                0_i64
            })
            .bind(enrollment.lead_minutes)
            .bind(match enrollment.sound {
                SoundPreference::Default => "default",
                SoundPreference::Chime => "chime",
                SoundPreference::Silent => "silent",
            })
            .bind(&enrollment.legacy_token)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(())
    }

    /// Upsert one course recurrence document (bootstrap/tests only).
    pub async fn set_recurrence(
        &self,
        course_id: &str,
        course_name: &str,
        spec: &RecurrenceSpec,
    ) -> Result<(), DbError> {
        let raw = serde_json::to_string(spec).map_err(|e| DbError::QueryError(e.to_string()))?;

        sqlx::query(r#"DELETE FROM course_recurrences WHERE course_id = $1"#)
            .bind(course_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO course_recurrences (course_id, course_name, spec) VALUES ($1, $2, $3)"#,
        )
        .bind(course_id)
        .bind(course_name)
        .bind(&raw)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(())
    }

    fn row_to_enrollment(row: &AnyRow) -> Enrollment {
        let sound_raw: String = row.try_get("sound").unwrap_or_default();
        Enrollment {
            user_id: row.try_get("user_id").unwrap_or_default(),
            course_id: row.try_get("course_id").unwrap_or_default(),
            course_name: row.try_get("course_name").unwrap_or_default(),
            display_name: row.try_get("display_name").unwrap_or_default(),
            phone_number: row.try_get("phone_number").ok(),
            is_active: row.try_get::<i64, _>("is_active").unwrap_or(0) != 0,
            notifications_enabled: row.try_get::<i64, _>("notifications_enabled").unwrap_or(0) != 0,
            lead_minutes: row.try_get("lead_minutes").unwrap_or(0),
            sound: SoundPreference::parse(&sound_raw).unwrap_or_default(),
            legacy_token: row.try_get("legacy_token").ok(),
        }
    }

    async fn fetch_active_enrollments(&self) -> Result<Vec<Enrollment>, DbError> {
        let query = r#"
            SELECT user_id, course_id, course_name, display_name, phone_number,
                   is_active, notifications_enabled, lead_minutes, sound, legacy_token
            FROM enrollments
            WHERE is_active = 1
            ORDER BY user_id, course_id
        "#;

        let rows = sqlx::query(query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load active enrollments: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(rows.iter().map(Self::row_to_enrollment).collect())
    }

    async fn fetch_recurrence(&self, course_id: &str) -> Result<Option<CourseRecurrence>, DbError> {
        let query = r#"
            SELECT course_id, course_name, spec
            FROM course_recurrences
            WHERE course_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(course_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load course recurrence: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let course_id: String = row.try_get("course_id").unwrap_or_default();
        let course_name: String = row.try_get("course_name").unwrap_or_default();
        let raw: String = row
            .try_get("spec")
            .map_err(|e| DbError::DecodeError(e.to_string()))?;

        let spec: RecurrenceSpec =
            serde_json::from_str(&raw).map_err(|e| DbError::DecodeError(e.to_string()))?;

        Ok(Some(spec.into_recurrence(course_id, course_name)))
    }

    async fn fetch_enrollees(&self, course_id: &str) -> Result<Vec<Enrollment>, DbError> {
        let query = r#"
            SELECT user_id, course_id, course_name, display_name, phone_number,
                   is_active, notifications_enabled, lead_minutes, sound, legacy_token
            FROM enrollments
            WHERE course_id = $1 AND is_active = 1
            ORDER BY user_id
        "#;

        let rows = sqlx::query(query)
            .bind(course_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load course enrollees: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(rows.iter().map(Self::row_to_enrollment).collect())
    }
}

impl EnrollmentProvider for SqlEnrollmentRepository {
    fn active_enrollments(&self) -> BoxFuture<'_, Vec<Enrollment>, BoxedError> {
        Box::pin(async move {
            self.fetch_active_enrollments()
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn course_recurrence(
        &self,
        course_id: &str,
    ) -> BoxFuture<'_, Option<CourseRecurrence>, BoxedError> {
        // Clone the value to avoid lifetime issues
        let course_id = course_id.to_string();

        Box::pin(async move {
            self.fetch_recurrence(&course_id)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn course_enrollees(&self, course_id: &str) -> BoxFuture<'_, Vec<Enrollment>, BoxedError> {
        // Clone the value to avoid lifetime issues
        let course_id = course_id.to_string();

        Box::pin(async move {
            self.fetch_enrollees(&course_id)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}
