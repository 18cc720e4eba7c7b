use axum::{
    routing::{delete, post},
    Router,
};
use std::sync::Arc;
use studify_config::AppConfig;
use studify_db::{DbClient, SqlDeviceRegistrationRepository};
use tracing::info;

use crate::client::PushClient;
use crate::handlers::{
    deactivate_all_handler, register_device_handler, send_notification_handler,
    unregister_device_handler, PushState,
};
use crate::registry::DeviceRegistry;

/// Create the push/device-registry routes for the API.
///
/// Note: schema initialization is performed at application startup, not here.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient) -> Router {
    let repo = SqlDeviceRegistrationRepository::new(db_client);
    let registry = Arc::new(DeviceRegistry::new(repo));
    let push_config = config.push.clone().unwrap_or_default();
    let client = Arc::new(PushClient::new(push_config));

    info!("Push routes initialized");

    let state = Arc::new(PushState { registry, client });

    Router::new()
        .route("/push/register-device", post(register_device_handler))
        .route("/push/device/{token}", delete(unregister_device_handler))
        .route("/push/deactivate-all", post(deactivate_all_handler))
        .route("/push/send-notification", post(send_notification_handler))
        .with_state(state)
}
