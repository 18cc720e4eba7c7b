//! SMS integration for Studify: the Twilio transport and the weekly quota
//! that every secondary-channel send must pass through.

pub mod client;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod limiter;
pub mod routes;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
pub use client::{SmsError, TwilioSmsClient};
pub use limiter::{has_exceeded, week_start, LimitedSmsSender, SmsSendError};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::SmsApiDoc;
}
