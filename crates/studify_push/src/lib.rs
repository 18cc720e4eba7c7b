//! Push notification integration for Studify
//!
//! This crate owns the device registry HTTP surface and the push transport:
//!
//! - Authentication with the push provider using service account credentials
//! - Sending push notifications to specific devices using destination tokens
//! - Bounded-chunk fan-out to a user's whole device set
//! - Device token lifecycle (register/claim, deactivate, deactivate-all)
//! - Integration with Axum for HTTP API endpoints
//! - OpenAPI documentation (with the `openapi` feature)

pub mod auth;
pub mod client;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod fanout;
pub mod handlers;
pub mod registry;
pub mod routes;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
// Re-export the transport client and fan-out entry points
pub use client::{PushClient, PushError};
pub use fanout::{deliver_to_tokens, FanoutReport};
pub use registry::{validate_token, DeviceRegistry, RegistryError};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::PushApiDoc;
}
