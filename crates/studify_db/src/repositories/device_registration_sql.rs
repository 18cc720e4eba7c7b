//! SQL implementation of the device registration repository

use crate::error::DbError;
use crate::repositories::device_registration::{DeviceRegistration, DeviceRegistrationRepository};
use crate::repositories::{format_ts, parse_ts};
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use studify_common::models::Platform;
use tracing::{debug, error, info, warn};

/// SQL implementation of the device registration repository
#[derive(Debug, Clone)]
pub struct SqlDeviceRegistrationRepository {
    db_client: DbClient,
}

impl SqlDeviceRegistrationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn row_to_registration(row: &AnyRow) -> Result<DeviceRegistration, DbError> {
        let platform_raw: String = row
            .try_get("platform")
            .map_err(|e| DbError::DecodeError(e.to_string()))?;
        let platform = Platform::parse(&platform_raw)
            .ok_or_else(|| DbError::DecodeError(format!("unknown platform: {}", platform_raw)))?;

        Ok(DeviceRegistration {
            id: row.try_get("id").ok(),
            user_id: row.try_get("user_id").unwrap_or_default(),
            destination_token: row.try_get("destination_token").unwrap_or_default(),
            platform,
            device_id: row.try_get("device_id").ok(),
            app_version: row.try_get("app_version").ok(),
            is_active: row.try_get::<i64, _>("is_active").unwrap_or(0) != 0,
            last_used_at: parse_ts(row.try_get("last_used_at").ok()),
            created_at: parse_ts(row.try_get("created_at").ok()),
            updated_at: parse_ts(row.try_get("updated_at").ok()),
        })
    }

    /// Reassign an existing token row to the registrant and refresh its
    /// metadata. Used both for ordinary re-registration and for resolving a
    /// duplicate-key race on insert.
    async fn claim_existing(
        &self,
        registration: &DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError> {
        let now = format_ts(Utc::now());

        let query = r#"
            UPDATE device_registrations
            SET user_id = $1, platform = $2, device_id = $3, app_version = $4,
                is_active = 1, last_used_at = $5, updated_at = $6
            WHERE destination_token = $7
            RETURNING id, user_id, destination_token, platform, device_id,
                      app_version, is_active, last_used_at, created_at, updated_at
        "#;

        let row = sqlx::query(query)
            .bind(&registration.user_id)
            .bind(registration.platform.as_str())
            .bind(&registration.device_id)
            .bind(&registration.app_version)
            .bind(&now)
            .bind(&now)
            .bind(&registration.destination_token)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update device registration: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Self::row_to_registration(&row)
    }
}

impl DeviceRegistrationRepository for SqlDeviceRegistrationRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device registration schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS device_registrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                destination_token TEXT NOT NULL UNIQUE,
                platform TEXT NOT NULL,
                device_id TEXT,
                app_version TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                last_used_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Device registration schema initialized successfully");
        Ok(())
    }

    async fn register(
        &self,
        registration: DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError> {
        debug!(
            "Registering device token for user: {}",
            registration.user_id
        );

        let existing = self
            .find_by_token(&registration.destination_token)
            .await?;

        if let Some(existing) = existing {
            if existing.user_id != registration.user_id {
                info!(
                    "Token claimed: ownership moves from user {} to user {}",
                    existing.user_id, registration.user_id
                );
            }
            return self.claim_existing(&registration).await;
        }

        let now = format_ts(Utc::now());

        let query = r#"
            INSERT INTO device_registrations
                (user_id, destination_token, platform, device_id, app_version,
                 is_active, last_used_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6, $7, $8)
            RETURNING id, user_id, destination_token, platform, device_id,
                      app_version, is_active, last_used_at, created_at, updated_at
        "#;

        let inserted = sqlx::query(query)
            .bind(&registration.user_id)
            .bind(&registration.destination_token)
            .bind(registration.platform.as_str())
            .bind(&registration.device_id)
            .bind(&registration.app_version)
            .bind(&now)
            .bind(&now)
            .bind(&now)
            .fetch_one(self.db_client.pool())
            .await;

        match inserted {
            Ok(row) => {
                info!("Device registration created successfully");
                Self::row_to_registration(&row)
            }
            Err(e) => {
                // Two devices racing on the same token: the unique index
                // rejected our insert, so the row now exists. Resolve the
                // race by retrying as a claim instead of surfacing a
                // conflict.
                warn!(
                    "Insert hit the unique token constraint, retrying as claim: {}",
                    e
                );
                self.claim_existing(&registration).await
            }
        }
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<DeviceRegistration>, DbError> {
        let query = r#"
            SELECT id, user_id, destination_token, platform, device_id,
                   app_version, is_active, last_used_at, created_at, updated_at
            FROM device_registrations
            WHERE destination_token = $1
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find device registration: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        result.map(|row| Self::row_to_registration(&row)).transpose()
    }

    async fn list_active(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, DbError> {
        debug!("Listing active device registrations for user: {}", user_id);

        let query = r#"
            SELECT id, user_id, destination_token, platform, device_id,
                   app_version, is_active, last_used_at, created_at, updated_at
            FROM device_registrations
            WHERE user_id = $1 AND is_active = 1
            ORDER BY created_at
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list device registrations: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(Self::row_to_registration).collect()
    }

    async fn deactivate(&self, token: &str) -> Result<bool, DbError> {
        debug!("Deactivating device registration");

        let query = r#"
            UPDATE device_registrations
            SET is_active = 0, updated_at = $1
            WHERE destination_token = $2 AND is_active = 1
        "#;

        let result = sqlx::query(query)
            .bind(format_ts(Utc::now()))
            .bind(token)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to deactivate device registration: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_all(&self, user_id: &str) -> Result<u64, DbError> {
        debug!("Deactivating all device registrations for user: {}", user_id);

        let query = r#"
            UPDATE device_registrations
            SET is_active = 0, updated_at = $1
            WHERE user_id = $2 AND is_active = 1
        "#;

        let result = sqlx::query(query)
            .bind(format_ts(Utc::now()))
            .bind(user_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to deactivate device registrations: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }

    async fn reclaim_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        debug!("Reclaiming inactive device registrations older than {}", cutoff);

        // Active rows are never reclaimed, regardless of age.
        let query = r#"
            DELETE FROM device_registrations
            WHERE is_active = 0 AND updated_at < $1
        "#;

        let result = sqlx::query(query)
            .bind(format_ts(cutoff))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to reclaim stale device registrations: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!("Reclaimed {} stale device registrations", deleted);
        }
        Ok(deleted)
    }
}
