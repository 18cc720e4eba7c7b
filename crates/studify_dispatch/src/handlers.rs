//! HTTP handlers for the dispatch gateway
//!
//! The broadcast endpoint is invoked internally by course-authoring routes;
//! the scan trigger exists for operational testing only (the stable contract
//! is the internal timer); the diagnostics report is a read-only operator
//! surface.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::broadcast::{BroadcastOutcome, BroadcastRequest};
use crate::error::DispatchError;
use crate::gateway::SqlDispatchGateway;
use crate::scan::ScanOutcome;

/// Shared state for dispatch handlers
#[derive(Clone)]
pub struct DispatchState {
    pub gateway: Arc<SqlDispatchGateway>,
}

/// Response body for the broadcast endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BroadcastResponse {
    pub success: bool,
    pub outcome: Option<BroadcastOutcome>,
    pub error: Option<String>,
}

/// Response body for the manual scan trigger
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScanResponse {
    pub success: bool,
    pub outcome: Option<ScanOutcome>,
    pub error: Option<String>,
}

fn dispatch_error_status(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DispatchError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DispatchError::ProviderError(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Handler for broadcasting an ad-hoc course event to all enrollees.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/dispatch/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Broadcast dispatched", body = BroadcastResponse),
        (status = 502, description = "Enrollment provider unavailable"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Dispatch"
))]
pub async fn broadcast_handler(
    State(state): State<Arc<DispatchState>>,
    Json(request): Json<BroadcastRequest>,
) -> Response {
    info!(
        "Broadcast requested for course {} ({})",
        request.course_id, request.kind
    );

    match state.gateway.broadcast(request).await {
        Ok(outcome) => Json(BroadcastResponse {
            success: true,
            outcome: Some(outcome),
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Broadcast failed: {}", err);
            (
                dispatch_error_status(&err),
                Json(BroadcastResponse {
                    success: false,
                    outcome: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for manually triggering one scan tick (operational testing).
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/dispatch/scan",
    responses(
        (status = 200, description = "Scan completed", body = ScanResponse),
        (status = 502, description = "Enrollment provider unavailable"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Dispatch"
))]
pub async fn scan_handler(State(state): State<Arc<DispatchState>>) -> Response {
    match state.gateway.tick(Utc::now()).await {
        Ok(outcome) => Json(ScanResponse {
            success: true,
            outcome: Some(outcome),
            error: None,
        })
        .into_response(),
        Err(err) => {
            error!("Manual scan failed: {}", err);
            (
                dispatch_error_status(&err),
                Json(ScanResponse {
                    success: false,
                    outcome: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for the per-course reminder eligibility report.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/dispatch/diagnostics/{course_id}",
    params(("course_id" = String, Path, description = "Course to report on")),
    responses(
        (status = 200, description = "Eligibility report", body = crate::diagnostics::CourseDiagnosticsReport),
        (status = 502, description = "Enrollment provider unavailable"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Dispatch"
))]
pub async fn diagnostics_handler(
    State(state): State<Arc<DispatchState>>,
    Path(course_id): Path<String>,
) -> Response {
    match state.gateway.course_report(&course_id).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!("Diagnostics report failed: {}", err);
            (dispatch_error_status(&err), err.to_string()).into_response()
        }
    }
}
