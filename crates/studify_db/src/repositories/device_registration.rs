//! Repository for device registrations
//!
//! This module defines the interface for the durable device registry: the
//! table of push-capable endpoints per user, keyed by a globally unique
//! destination token.

use crate::error::DbError;
use chrono::{DateTime, Utc};

// Re-export DeviceRegistration from studify_common for convenience
pub use studify_common::models::DeviceRegistration;

/// Repository for device registrations.
///
/// `register` implements *claim* semantics: the destination token is globally
/// unique, and registering a token already owned by another user reassigns it
/// to the new registrant (the token follows the physical device, not the
/// account that last logged in from it). The postcondition is always "exactly
/// one active owner for this token".
pub trait DeviceRegistrationRepository {
    /// Create the registry table if it does not already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Upsert a registration by destination token.
    ///
    /// Always leaves the row active with a refreshed `last_used_at`. Calling
    /// twice with identical input is a no-op beyond timestamp refresh. A
    /// duplicate-key race on the unique token index is resolved by retrying
    /// as an update rather than surfacing the conflict.
    fn register(
        &self,
        registration: DeviceRegistration,
    ) -> impl std::future::Future<Output = Result<DeviceRegistration, DbError>> + Send;

    /// Find a registration by its destination token, active or not.
    fn find_by_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<DeviceRegistration>, DbError>> + Send;

    /// All active registrations for a user; the dispatch gateway fans out to
    /// exactly this set.
    fn list_active(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<DeviceRegistration>, DbError>> + Send;

    /// Soft-delete one registration by token. Returns `true` if a row was
    /// deactivated. The row is kept for diagnostics.
    fn deactivate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Soft-delete every registration a user owns (logout everywhere /
    /// account deletion). Returns the number of rows deactivated.
    fn deactivate_all(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;

    /// Hard-delete rows that are inactive and were last touched before
    /// `cutoff`. Active rows are never touched regardless of age. Returns the
    /// number of rows deleted.
    fn reclaim_stale(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;
}
