//! HTTP handler for the quota-aware SMS send endpoint.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::limiter::{LimitedSmsSender, SmsSendError};
use studify_db::SqlSmsLogRepository;

/// Shared state for SMS handlers
#[derive(Clone)]
pub struct SmsState {
    pub sender: Arc<LimitedSmsSender<SqlSmsLogRepository>>,
}

/// Request body for sending a text message
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SmsRequest {
    /// Authenticated user id the quota is charged against
    pub user_id: String,
    pub to: String,
    pub message: String,
    /// Message category, defaults to "course_reminder"
    pub kind: Option<String>,
    pub course_id: Option<String>,
}

/// Response body for the send endpoint
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SmsResponse {
    pub success: bool,
    pub message: String,
}

/// Handler for sending a text message through the rate-limited secondary
/// channel.
///
/// Refuses with 429 once the user's weekly quota is reached; a refusal makes
/// no transport call and writes no log row.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/sms/send",
    request_body = SmsRequest,
    responses(
        (status = 200, description = "SMS sent", body = SmsResponse),
        (status = 429, description = "Weekly quota exceeded"),
        (status = 502, description = "Transport error"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Sms"
))]
pub async fn send_sms_handler(
    State(state): State<Arc<SmsState>>,
    Json(request): Json<SmsRequest>,
) -> Response {
    let kind = request
        .kind
        .unwrap_or_else(|| "course_reminder".to_string());

    match state
        .sender
        .send_limited(
            &request.user_id,
            &request.to,
            &request.message,
            &kind,
            request.course_id,
            Utc::now(),
        )
        .await
    {
        Ok(result) => {
            info!("SMS sent to {}: {}", request.to, result.id);
            Json(SmsResponse {
                success: true,
                message: "SMS sent successfully".into(),
            })
            .into_response()
        }
        Err(err) => {
            let status = match &err {
                SmsSendError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                SmsSendError::TransportError(_) => StatusCode::BAD_GATEWAY,
                SmsSendError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!("Failed to send SMS: {}", err);
            (
                status,
                Json(SmsResponse {
                    success: false,
                    message: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}
