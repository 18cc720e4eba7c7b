// --- File: crates/studify_dispatch/src/error.rs ---
use studify_db::DbError;
use thiserror::Error;

/// Dispatch-specific error types.
///
/// Nothing here is fatal to the host process: a per-user failure inside the
/// scan is logged and skipped, and only top-level store/provider failures
/// surface through this enum (aborting the tick so its window is retried).
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Enrollment provider error: {0}")]
    ProviderError(String),
}

impl From<DbError> for DispatchError {
    fn from(err: DbError) -> Self {
        DispatchError::StoreError(err.to_string())
    }
}
