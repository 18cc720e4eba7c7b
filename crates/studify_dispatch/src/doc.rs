#![allow(dead_code)]
use utoipa::OpenApi;

use crate::broadcast::{BroadcastOutcome, BroadcastRequest};
use crate::diagnostics::{CourseDiagnosticsReport, EnrolleeDiagnostics};
use crate::handlers::{BroadcastResponse, ScanResponse};
use crate::scan::ScanOutcome;

#[utoipa::path(
    post,
    path = "/dispatch/broadcast",
    request_body(content = BroadcastRequest, example = json!({
        "course_id": "c-algo",
        "title": "New quiz available",
        "message": "Quiz 3 on graph algorithms is now open until Friday.",
        "kind": "quiz",
        "data": { "quiz_id": "q-3" }
    })),
    responses(
        (status = 200, description = "Broadcast dispatched", body = BroadcastResponse,
         example = json!({
             "success": true,
             "outcome": {
                 "recipients": 42,
                 "deliveries_attempted": 57,
                 "delivered": 55,
                 "devices_deactivated": 2
             },
             "error": null
         })
        ),
        (status = 502, description = "Enrollment provider unavailable"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Dispatch"
)]
fn doc_broadcast_handler() {}

#[utoipa::path(
    post,
    path = "/dispatch/scan",
    responses(
        (status = 200, description = "Scan completed", body = ScanResponse),
        (status = 502, description = "Enrollment provider unavailable"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Dispatch"
)]
fn doc_scan_handler() {}

#[utoipa::path(
    get,
    path = "/dispatch/diagnostics/{course_id}",
    params(("course_id" = String, Path, description = "Course to report on")),
    responses(
        (status = 200, description = "Eligibility report", body = CourseDiagnosticsReport,
         example = json!({
             "course_id": "c-algo",
             "enrollees": [{
                 "user_id": "user123",
                 "display_name": "Dana",
                 "active_access": true,
                 "notifications_enabled": true,
                 "device_count": 2,
                 "has_legacy_token": false
             }]
         })
        ),
        (status = 502, description = "Enrollment provider unavailable")
    ),
    tag = "Dispatch"
)]
fn doc_diagnostics_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_broadcast_handler,
        doc_scan_handler,
        doc_diagnostics_handler,
    ),
    components(
        schemas(
            BroadcastRequest,
            BroadcastOutcome,
            BroadcastResponse,
            ScanOutcome,
            ScanResponse,
            CourseDiagnosticsReport,
            EnrolleeDiagnostics,
        )
    ),
    tags(
        (name = "Dispatch", description = "Reminder dispatch and diagnostics API")
    ),
    servers(
        (url = "/api", description = "Studify API server")
    )
)]
pub struct DispatchApiDoc;
