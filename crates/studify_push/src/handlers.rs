//! HTTP handlers for the device registry and the push transport
//!
//! The register/unregister endpoints own the device token lifecycle; the
//! send-notification endpoint exists for operational testing of the
//! transport. All handlers are keyed off the caller's authenticated identity,
//! which the identity provider upstream of this service places in the request
//! payload as an opaque user id.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::client::{PushClient, PushError};
use crate::registry::{DeviceRegistry, RegistryError};
use studify_common::models::{Platform, SoundPreference};
use studify_common::services::PushPayload;
use studify_db::SqlDeviceRegistrationRepository;

/// Shared state for push handlers
#[derive(Clone)]
pub struct PushState {
    pub registry: Arc<DeviceRegistry<SqlDeviceRegistrationRepository>>,
    pub client: Arc<PushClient>,
}

/// Request body for registering a device
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceRequest {
    /// Authenticated user id (opaque)
    pub user_id: String,

    /// The push transport registration token for this device
    pub token: String,

    /// "ios" or "android"
    pub platform: String,

    /// Client-reported device identifier
    pub device_id: Option<String>,

    /// Client-reported app version
    pub app_version: Option<String>,
}

/// Response body for the register device endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceResponse {
    pub success: bool,

    /// The platform the registration was stored under
    pub platform: Option<String>,

    pub error: Option<String>,
}

/// Response body for the unregister endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnregisterDeviceResponse {
    pub success: bool,

    /// Whether an active registration existed for the token
    pub removed: bool,

    pub error: Option<String>,
}

/// Request body for deactivating every device a user owns
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeactivateAllRequest {
    pub user_id: String,
}

/// Response body for the deactivate-all endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeactivateAllResponse {
    pub success: bool,
    pub deactivated: u64,
    pub error: Option<String>,
}

/// Request body for the operational send endpoint
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendNotificationRequest {
    /// Destination token of the target device
    pub token: String,

    pub title: String,
    pub body: String,

    /// Sound preference resolved into a notification channel
    pub sound: Option<String>,

    /// Custom key-value data for the client app
    pub data: Option<std::collections::HashMap<String, String>>,
}

/// Response body for the operational send endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

fn registry_error_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::ValidationError(_) => StatusCode::BAD_REQUEST,
        RegistryError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler for registering a device for push notifications.
///
/// Upserts by token with claim semantics: registering a token that another
/// user currently owns reassigns it to the caller.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/push/register-device",
    request_body = RegisterDeviceRequest,
    responses(
        (status = 200, description = "Device registered successfully", body = RegisterDeviceResponse),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
))]
pub async fn register_device_handler(
    State(state): State<Arc<PushState>>,
    Json(payload): Json<RegisterDeviceRequest>,
) -> Response {
    debug!("Registering device for user: {}", payload.user_id);

    let Some(platform) = Platform::parse(&payload.platform) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterDeviceResponse {
                success: false,
                platform: None,
                error: Some(format!("Unknown platform: {}", payload.platform)),
            }),
        )
            .into_response();
    };

    match state
        .registry
        .register(
            &payload.user_id,
            &payload.token,
            platform,
            payload.device_id,
            payload.app_version,
        )
        .await
    {
        Ok(registration) => {
            info!(
                "Successfully registered device for user: {}",
                registration.user_id
            );
            Json(RegisterDeviceResponse {
                success: true,
                platform: Some(registration.platform.as_str().to_string()),
                error: None,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to register device: {:?}", err);
            (
                registry_error_status(&err),
                Json(RegisterDeviceResponse {
                    success: false,
                    platform: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for removing the current device's registration (logout).
///
/// Soft-deletes only; the row stays available for diagnostics until the
/// cleanup job reclaims it.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/push/device/{token}",
    params(("token" = String, Path, description = "Destination token to deactivate")),
    responses(
        (status = 200, description = "Device deactivated", body = UnregisterDeviceResponse),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
))]
pub async fn unregister_device_handler(
    State(state): State<Arc<PushState>>,
    Path(token): Path<String>,
) -> Response {
    match state.registry.deactivate(&token).await {
        Ok(removed) => Json(UnregisterDeviceResponse {
            success: true,
            removed,
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Failed to deactivate device: {:?}", err);
            (
                registry_error_status(&err),
                Json(UnregisterDeviceResponse {
                    success: false,
                    removed: false,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for deactivating every device a user owns (account deletion hook).
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/push/deactivate-all",
    request_body = DeactivateAllRequest,
    responses(
        (status = 200, description = "Devices deactivated", body = DeactivateAllResponse),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
))]
pub async fn deactivate_all_handler(
    State(state): State<Arc<PushState>>,
    Json(payload): Json<DeactivateAllRequest>,
) -> Response {
    match state.registry.deactivate_all(&payload.user_id).await {
        Ok(deactivated) => {
            info!(
                "Deactivated {} devices for user: {}",
                deactivated, payload.user_id
            );
            Json(DeactivateAllResponse {
                success: true,
                deactivated,
                error: None,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to deactivate devices: {:?}", err);
            (
                registry_error_status(&err),
                Json(DeactivateAllResponse {
                    success: false,
                    deactivated: 0,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for sending a push notification to one destination token.
///
/// Operational testing surface; the dispatch gateway does not go through
/// HTTP.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/push/send-notification",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification sent successfully", body = SendNotificationResponse),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
))]
pub async fn send_notification_handler(
    State(state): State<Arc<PushState>>,
    Json(payload): Json<SendNotificationRequest>,
) -> Response {
    let channel_id = payload
        .sound
        .as_deref()
        .and_then(SoundPreference::parse)
        .map(|sound| sound.channel_id().to_string());

    let push_payload = PushPayload {
        title: payload.title,
        body: payload.body,
        channel_id,
        data: payload.data,
    };

    match state
        .client
        .send_to_device(&payload.token, &push_payload)
        .await
    {
        Ok(message_id) => {
            info!("Successfully sent push notification: {}", message_id);
            Json(SendNotificationResponse {
                success: true,
                message_id: Some(message_id),
                error: None,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to send push notification: {:?}", err);
            let status = match &err {
                PushError::AuthError(_) => StatusCode::UNAUTHORIZED,
                PushError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PushError::RequestError(_) => StatusCode::BAD_REQUEST,
                PushError::InvalidToken(_) => StatusCode::BAD_REQUEST,
                PushError::ApiError(_) => StatusCode::BAD_REQUEST,
            };

            (
                status,
                Json(SendNotificationResponse {
                    success: false,
                    message_id: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
