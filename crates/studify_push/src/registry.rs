// --- File: crates/studify_push/src/registry.rs ---
//! Device registry operations.
//!
//! Thin layer over the registration repository that enforces validation
//! before anything reaches the store: a malformed destination token is
//! rejected synchronously and never written.

use studify_common::models::{DeviceRegistration, Platform};
use studify_db::{DbError, DeviceRegistrationRepository};
use thiserror::Error;
use tracing::info;

/// Registry-specific error types.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The request was rejected before reaching the store
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from the underlying store
    #[error("Database error: {0}")]
    DbError(#[from] DbError),
}

const MIN_TOKEN_LEN: usize = 8;
const MAX_TOKEN_LEN: usize = 4096;

/// Reject malformed destination tokens before they reach the store.
pub fn validate_token(token: &str) -> Result<(), RegistryError> {
    if token.is_empty() {
        return Err(RegistryError::ValidationError(
            "destination token is empty".to_string(),
        ));
    }
    if token.len() < MIN_TOKEN_LEN || token.len() > MAX_TOKEN_LEN {
        return Err(RegistryError::ValidationError(format!(
            "destination token length {} outside {}..={}",
            token.len(),
            MIN_TOKEN_LEN,
            MAX_TOKEN_LEN
        )));
    }
    if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(RegistryError::ValidationError(
            "destination token contains whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

/// Device registry over a registration repository.
#[derive(Debug, Clone)]
pub struct DeviceRegistry<R> {
    repo: R,
}

impl<R: DeviceRegistrationRepository> DeviceRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Claim a destination token for a user.
    ///
    /// Upserts by token: an existing registration (under any user) is
    /// refreshed and reassigned, a new token is inserted. The result is
    /// always an active registration owned by `user_id`.
    pub async fn register(
        &self,
        user_id: &str,
        token: &str,
        platform: Platform,
        device_id: Option<String>,
        app_version: Option<String>,
    ) -> Result<DeviceRegistration, RegistryError> {
        if user_id.is_empty() {
            return Err(RegistryError::ValidationError(
                "user id is empty".to_string(),
            ));
        }
        validate_token(token)?;

        let mut registration =
            DeviceRegistration::new(user_id.to_string(), token.to_string(), platform);
        registration.device_id = device_id;
        registration.app_version = app_version;

        let stored = self.repo.register(registration).await?;
        info!(
            "Device registered for user {} on {}",
            stored.user_id,
            stored.platform.as_str()
        );
        Ok(stored)
    }

    /// All active registrations for a user; the fan-out set.
    pub async fn list_active(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, RegistryError> {
        Ok(self.repo.list_active(user_id).await?)
    }

    /// Soft-delete one registration (logout / explicit removal). Returns
    /// whether a row was deactivated.
    pub async fn deactivate(&self, token: &str) -> Result<bool, RegistryError> {
        validate_token(token)?;
        Ok(self.repo.deactivate(token).await?)
    }

    /// Soft-delete every registration a user owns (account deletion hook).
    pub async fn deactivate_all(&self, user_id: &str) -> Result<u64, RegistryError> {
        Ok(self.repo.deactivate_all(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use studify_db::DbError;

    /// Minimal in-memory repository with the same claim contract as the SQL
    /// implementation.
    #[derive(Clone, Default)]
    struct MemoryRepo {
        rows: Arc<Mutex<Vec<DeviceRegistration>>>,
    }

    impl DeviceRegistrationRepository for MemoryRepo {
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

        async fn find_by_token(
            &self,
            token: &str,
        ) -> Result<Option<DeviceRegistration>, DbError> {
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
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn deactivate_all(&self, user_id: &str) -> Result<u64, DbError> {
            let mut rows = self.rows.lock().unwrap();
            let mut count = 0;
            for row in rows
                .iter_mut()
                .filter(|r| r.user_id == user_id && r.is_active)
            {
                row.is_active = false;
                count += 1;
            }
            Ok(count)
        }

        async fn reclaim_stale(
            &self,
            cutoff: chrono::DateTime<Utc>,
        ) -> Result<u64, DbError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.is_active || r.updated_at.map(|ts| ts >= cutoff).unwrap_or(true));
            Ok((before - rows.len()) as u64)
        }
    }

    const TOKEN: &str = "dGVzdC10b2tlbi0xMjM0NTY3ODkw:APA91b";

    #[tokio::test]
    async fn registering_the_same_token_twice_claims_it_for_the_second_user() {
        let repo = MemoryRepo::default();
        let registry = DeviceRegistry::new(repo.clone());

        registry
            .register("user-a", TOKEN, Platform::Android, None, None)
            .await
            .unwrap();
        let claimed = registry
            .register("user-b", TOKEN, Platform::Android, None, None)
            .await
            .unwrap();

        // Exactly one row, active, owned by the last registrant.
        assert_eq!(claimed.user_id, "user-b");
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
        assert!(registry.list_active("user-a").await.unwrap().is_empty());
        assert_eq!(registry.list_active("user-b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deactivate_keeps_the_row_for_diagnostics() {
        let repo = MemoryRepo::default();
        let registry = DeviceRegistry::new(repo.clone());

        registry
            .register("user-a", TOKEN, Platform::Ios, None, None)
            .await
            .unwrap();
        assert!(registry.deactivate(TOKEN).await.unwrap());

        assert!(registry.list_active("user-a").await.unwrap().is_empty());
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_token_never_reaches_the_store() {
        let repo = MemoryRepo::default();
        let registry = DeviceRegistry::new(repo.clone());

        let result = registry
            .register("user-a", "bad token", Platform::Ios, None, None)
            .await;

        assert!(matches!(result, Err(RegistryError::ValidationError(_))));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(
            validate_token(""),
            Err(RegistryError::ValidationError(_))
        ));
    }

    #[test]
    fn short_and_oversized_tokens_are_rejected() {
        assert!(validate_token("abc").is_err());
        let oversized = "a".repeat(5000);
        assert!(validate_token(&oversized).is_err());
    }

    #[test]
    fn token_with_whitespace_is_rejected() {
        assert!(validate_token("abc def ghij").is_err());
        assert!(validate_token("abcd\nefgh").is_err());
    }

    #[test]
    fn plausible_fcm_token_is_accepted() {
        assert!(validate_token("dGVzdC10b2tlbi0xMjM0NTY3ODkw:APA91b").is_ok());
    }
}
