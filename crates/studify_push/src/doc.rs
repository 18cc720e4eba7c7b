#![allow(dead_code)]
use utoipa::OpenApi;

use crate::client::{AndroidConfig, AndroidNotification, FcmMessage, Message, Notification};
use crate::handlers::{
    DeactivateAllRequest, DeactivateAllResponse, RegisterDeviceRequest, RegisterDeviceResponse,
    SendNotificationRequest, SendNotificationResponse, UnregisterDeviceResponse,
};

#[utoipa::path(
    post,
    path = "/push/register-device",
    request_body(content = RegisterDeviceRequest, example = json!({
        "user_id": "user123",
        "token": "fcm-registration-token-example",
        "platform": "android",
        "device_id": "device456",
        "app_version": "2.4.1"
    })),
    responses(
        (status = 200, description = "Device registered successfully", body = RegisterDeviceResponse,
         example = json!({
             "success": true,
             "platform": "android",
             "error": null
         })
        ),
        (status = 400, description = "Bad Request",
         example = json!({
             "success": false,
             "platform": null,
             "error": "Validation error: destination token is empty"
         })
        ),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
)]
fn doc_register_device_handler() {}

#[utoipa::path(
    delete,
    path = "/push/device/{token}",
    params(("token" = String, Path, description = "Destination token to deactivate")),
    responses(
        (status = 200, description = "Device deactivated", body = UnregisterDeviceResponse,
         example = json!({
             "success": true,
             "removed": true,
             "error": null
         })
        ),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
)]
fn doc_unregister_device_handler() {}

#[utoipa::path(
    post,
    path = "/push/deactivate-all",
    request_body(content = DeactivateAllRequest, example = json!({
        "user_id": "user123"
    })),
    responses(
        (status = 200, description = "Devices deactivated", body = DeactivateAllResponse),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
)]
fn doc_deactivate_all_handler() {}

#[utoipa::path(
    post,
    path = "/push/send-notification",
    request_body(content = SendNotificationRequest, example = json!({
        "token": "fcm-registration-token-example",
        "title": "Algorithms",
        "body": "Session starts at 10:00 in Room 12",
        "sound": "chime"
    })),
    responses(
        (status = 200, description = "Notification sent successfully", body = SendNotificationResponse,
         example = json!({
             "success": true,
             "message_id": "projects/my-project/messages/1234567890",
             "error": null
         })
        ),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Push"
)]
fn doc_send_notification_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_register_device_handler,
        doc_unregister_device_handler,
        doc_deactivate_all_handler,
        doc_send_notification_handler,
    ),
    components(
        schemas(
            RegisterDeviceRequest,
            RegisterDeviceResponse,
            UnregisterDeviceResponse,
            DeactivateAllRequest,
            DeactivateAllResponse,
            SendNotificationRequest,
            SendNotificationResponse,
            FcmMessage,
            Message,
            Notification,
            AndroidConfig,
            AndroidNotification,
        )
    ),
    tags(
        (name = "Push", description = "Device registry and push transport API")
    ),
    servers(
        (url = "/api", description = "Studify API server")
    )
)]
pub struct PushApiDoc;
