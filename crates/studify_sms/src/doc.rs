#![allow(dead_code)]
use utoipa::OpenApi;

use crate::handlers::{SmsRequest, SmsResponse};

#[utoipa::path(
    post,
    path = "/sms/send",
    request_body(content = SmsRequest, example = json!({
        "user_id": "user123",
        "to": "+41790000001",
        "message": "Algorithms starts at 10:00 in Room 12",
        "kind": "course_reminder",
        "course_id": "c-algo"
    })),
    responses(
        (status = 200, description = "SMS sent", body = SmsResponse,
         example = json!({
             "success": true,
             "message": "SMS sent successfully"
         })
        ),
        (status = 429, description = "Weekly quota exceeded",
         example = json!({
             "success": false,
             "message": "Weekly SMS quota exceeded: 5 of 5 used"
         })
        ),
        (status = 502, description = "Transport error"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Sms"
)]
fn doc_send_sms_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_send_sms_handler),
    components(schemas(SmsRequest, SmsResponse)),
    tags(
        (name = "Sms", description = "Rate-limited secondary channel API")
    ),
    servers(
        (url = "/api", description = "Studify API server")
    )
)]
pub struct SmsApiDoc;
