// --- File: crates/studify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the external services the core
//! depends on: the push transport, the text-message transport, and the
//! course/enrollment store. The traits allow for dependency injection and
//! easier testing by decoupling the scheduling and dispatch logic from the
//! concrete implementations.

use crate::models::{CourseRecurrence, Enrollment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// The notification content delivered to one destination token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    /// Transport-level channel identifier, resolved once per delivery from the
    /// recipient's sound preference
    pub channel_id: Option<String>,
    /// Custom key-value data made available to the client app
    pub data: Option<HashMap<String, String>>,
}

/// Delivery failure for a single destination.
///
/// `InvalidToken` means the transport has declared the destination dead
/// (expired or unregistered token); callers are expected to deactivate the
/// registration so future scans stop retrying it. Everything else is a
/// transient transport failure.
#[derive(Error, Debug)]
pub enum PushDeliveryError {
    #[error("destination token rejected by transport: {0}")]
    InvalidToken(String),
    #[error("push transport error: {0}")]
    Transport(String),
}

/// A trait for the push transport.
///
/// One call delivers one payload to one destination token; multicast and
/// chunking are the caller's concern.
pub trait PushTransport: Send + Sync {
    /// Deliver the payload to a single destination token, returning the
    /// transport's message id on success.
    fn send_to_token(
        &self,
        token: &str,
        payload: &PushPayload,
    ) -> BoxFuture<'_, String, PushDeliveryError>;
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}

/// A trait for the secondary-channel text-message transport.
pub trait SmsTransport: Send + Sync {
    /// Send a text message.
    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, BoxedError>;
}

/// Read-only view of the course/enrollment store.
///
/// The core never writes through this trait; course editing is owned
/// elsewhere.
pub trait EnrollmentProvider: Send + Sync {
    /// Every enrollment row that still grants course access.
    fn active_enrollments(&self) -> BoxFuture<'_, Vec<Enrollment>, BoxedError>;

    /// The weekly recurrence definition for one course, if the course exists.
    fn course_recurrence(
        &self,
        course_id: &str,
    ) -> BoxFuture<'_, Option<CourseRecurrence>, BoxedError>;

    /// All current enrollees of one course.
    fn course_enrollees(&self, course_id: &str) -> BoxFuture<'_, Vec<Enrollment>, BoxedError>;
}
