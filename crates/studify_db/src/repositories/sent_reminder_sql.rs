//! SQL implementation of the sent-reminder dedup repository

use crate::error::DbError;
use crate::repositories::format_ts;
use crate::repositories::sent_reminder::SentReminderRepository;
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, error};

/// SQL implementation of the sent-reminder dedup repository
#[derive(Debug, Clone)]
pub struct SqlSentReminderRepository {
    db_client: DbClient,
}

impl SqlSentReminderRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl SentReminderRepository for SqlSentReminderRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing sent reminder schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS sent_reminders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                course_id TEXT NOT NULL,
                session_start TEXT NOT NULL,
                sent_at TEXT NOT NULL,
                UNIQUE(user_id, course_id, session_start)
            )
        "#;

        self.db_client.execute(query).await?;
        Ok(())
    }

    async fn was_sent(
        &self,
        user_id: &str,
        course_id: &str,
        session_start: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let query = r#"
            SELECT COUNT(*) AS hit_count
            FROM sent_reminders
            WHERE user_id = $1 AND course_id = $2 AND session_start = $3
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(course_id)
            .bind(format_ts(session_start))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to check sent reminder: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let count: i64 = row
            .try_get("hit_count")
            .map_err(|e| DbError::DecodeError(e.to_string()))?;
        Ok(count > 0)
    }

    async fn mark_sent(
        &self,
        user_id: &str,
        course_id: &str,
        session_start: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let query = r#"
            INSERT INTO sent_reminders (user_id, course_id, session_start, sent_at)
            VALUES ($1, $2, $3, $4)
        "#;

        let inserted = sqlx::query(query)
            .bind(user_id)
            .bind(course_id)
            .bind(format_ts(session_start))
            .bind(format_ts(Utc::now()))
            .execute(self.db_client.pool())
            .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(e) => {
                // A concurrent worker may have marked the same triple; the
                // unique index rejecting us means the marker already exists.
                if self.was_sent(user_id, course_id, session_start).await? {
                    Ok(())
                } else {
                    error!("Failed to mark reminder as sent: {}", e);
                    Err(DbError::QueryError(e.to_string()))
                }
            }
        }
    }
}
