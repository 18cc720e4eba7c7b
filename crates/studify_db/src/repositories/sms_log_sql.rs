//! SQL implementation of the SMS send log repository

use crate::error::DbError;
use crate::repositories::sms_log::{SmsLogRepository, SmsSendLog};
use crate::repositories::{format_ts, parse_ts};
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, error};

/// SQL implementation of the SMS send log repository
#[derive(Debug, Clone)]
pub struct SqlSmsLogRepository {
    db_client: DbClient,
}

impl SqlSmsLogRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl SmsLogRepository for SqlSmsLogRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing SMS send log schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS sms_send_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                message TEXT NOT NULL,
                kind TEXT NOT NULL,
                course_id TEXT,
                sent_at TEXT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;
        Ok(())
    }

    async fn record(&self, entry: SmsSendLog) -> Result<SmsSendLog, DbError> {
        debug!("Recording SMS send for user: {}", entry.user_id);

        let query = r#"
            INSERT INTO sms_send_log (user_id, phone_number, message, kind, course_id, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, phone_number, message, kind, course_id, sent_at
        "#;

        let row = sqlx::query(query)
            .bind(&entry.user_id)
            .bind(&entry.phone_number)
            .bind(&entry.message)
            .bind(&entry.kind)
            .bind(&entry.course_id)
            .bind(format_ts(entry.sent_at))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to record SMS send: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(SmsSendLog {
            id: row.try_get("id").ok(),
            user_id: row.try_get("user_id").unwrap_or_default(),
            phone_number: row.try_get("phone_number").unwrap_or_default(),
            message: row.try_get("message").unwrap_or_default(),
            kind: row.try_get("kind").unwrap_or_default(),
            course_id: row.try_get("course_id").ok(),
            sent_at: parse_ts(row.try_get("sent_at").ok()).unwrap_or(entry.sent_at),
        })
    }

    async fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64, DbError> {
        let query = r#"
            SELECT COUNT(*) AS send_count
            FROM sms_send_log
            WHERE user_id = $1 AND sent_at >= $2
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(format_ts(since))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to count SMS sends: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.try_get::<i64, _>("send_count")
            .map_err(|e| DbError::DecodeError(e.to_string()))
    }
}
