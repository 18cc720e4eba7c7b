// --- File: crates/studify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Data structures and models
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, external_service_error, internal_error, not_found, validation_error,
    Context, HttpStatusCode, StudifyError,
};

// Re-export HTTP utilities for easier access
pub use http::{create_client, handle_json_result, map_json_error, IntoHttpResponse, HTTP_CLIENT};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result};

// Re-export feature flag handling utilities for easier access
pub use features::is_feature_enabled;

// Conditionally re-export feature-specific functions
#[cfg(feature = "push")]
pub use features::is_push_enabled;

#[cfg(feature = "sms")]
pub use features::is_sms_enabled;

#[cfg(feature = "dispatch")]
pub use features::is_dispatch_enabled;
