//! Firebase Cloud Messaging client module
//!
//! Client for the FCM HTTP v1 API. One call delivers one message to one
//! destination token; the notification's Android channel is resolved once per
//! delivery from the recipient's sound preference before the message is
//! built, never re-derived downstream.

use crate::auth::get_push_auth_token;
use serde::{Deserialize, Serialize};
use studify_common::services::{BoxFuture, PushDeliveryError, PushPayload, PushTransport};
use studify_config::PushConfig;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when interacting with the FCM API
#[derive(Error, Debug)]
pub enum PushError {
    /// Error during authentication with the push provider
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during the HTTP request to the push provider
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// The provider has declared this destination token dead; callers should
    /// deactivate the registration
    #[error("Destination token rejected: {0}")]
    InvalidToken(String),

    /// Any other error returned by the provider API
    #[error("Push API error: {0}")]
    ApiError(String),
}

/// Top-level FCM HTTP v1 request wrapper.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FcmMessage {
    pub message: Message,
}

/// The message payload for one destination token.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Message {
    /// Registration token of the target device
    pub token: String,

    /// The notification displayed on the device
    pub notification: Option<Notification>,

    /// Android delivery options (notification channel)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,

    /// Custom key-value data made available to the client app
    pub data: Option<std::collections::HashMap<String, String>>,
}

/// Title and body of the displayed notification.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AndroidNotification {
    pub channel_id: String,
}

/// Response from the FCM API after a successful send.
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    /// "projects/{project_id}/messages/{message_id}"
    pub name: String,
}

/// Client for the Firebase Cloud Messaging HTTP v1 API.
pub struct PushClient {
    client: reqwest::Client,
    config: PushConfig,
}

impl PushClient {
    pub fn new(config: PushConfig) -> Self {
        Self {
            client: studify_common::create_client(),
            config,
        }
    }

    /// Build the FCM message for one destination from a transport payload.
    fn build_message(token: &str, payload: &PushPayload) -> FcmMessage {
        FcmMessage {
            message: Message {
                token: token.to_string(),
                notification: Some(Notification {
                    title: payload.title.clone(),
                    body: payload.body.clone(),
                }),
                android: payload.channel_id.as_ref().map(|channel_id| AndroidConfig {
                    notification: AndroidNotification {
                        channel_id: channel_id.clone(),
                    },
                }),
                data: payload.data.clone(),
            },
        }
    }

    /// Deliver one payload to one destination token, returning the message id.
    ///
    /// # Errors
    ///
    /// `InvalidToken` when the provider reports the token as unregistered or
    /// otherwise dead; other variants for auth, config, and transport
    /// failures.
    pub async fn send_to_device(
        &self,
        token: &str,
        payload: &PushPayload,
    ) -> Result<String, PushError> {
        let project_id = self
            .config
            .project_id
            .as_deref()
            .ok_or_else(|| PushError::ConfigError("Missing project_id in PushConfig".to_string()))?;

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            project_id
        );

        let auth_token = get_push_auth_token(&self.config)
            .await
            .map_err(|e| PushError::AuthError(e.to_string()))?;

        let message = Self::build_message(token, payload);
        debug!("Sending push notification to one destination token");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", auth_token))
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // The v1 API reports a dead registration as 404/UNREGISTERED.
            if status == reqwest::StatusCode::NOT_FOUND || error_text.contains("UNREGISTERED") {
                return Err(PushError::InvalidToken(error_text));
            }
            return Err(PushError::ApiError(format!("{}: {}", status, error_text)));
        }

        let fcm_response: FcmResponse = response.json().await?;
        Ok(fcm_response.name)
    }
}

impl PushTransport for PushClient {
    fn send_to_token(
        &self,
        token: &str,
        payload: &PushPayload,
    ) -> BoxFuture<'_, String, PushDeliveryError> {
        // Clone the values to avoid lifetime issues
        let token = token.to_string();
        let payload = payload.clone();

        Box::pin(async move {
            self.send_to_device(&token, &payload)
                .await
                .map_err(|err| match err {
                    PushError::InvalidToken(message) => PushDeliveryError::InvalidToken(message),
                    other => PushDeliveryError::Transport(other.to_string()),
                })
        })
    }
}
