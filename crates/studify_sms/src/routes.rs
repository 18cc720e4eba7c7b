use axum::{routing::post, Router};
use std::sync::Arc;
use studify_config::AppConfig;
use studify_db::{DbClient, SqlSmsLogRepository};
use tracing::info;

use crate::client::TwilioSmsClient;
use crate::handlers::{send_sms_handler, SmsState};
use crate::limiter::LimitedSmsSender;

/// Create the SMS routes for the API.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient) -> Router {
    let tz: chrono_tz::Tz = config
        .timezone
        .parse()
        .unwrap_or(chrono_tz::Europe::Zurich);

    let twilio_config = config.twilio.clone().unwrap_or_else(|| {
        // Missing config still mounts the route; the client refuses at send
        // time with a config error.
        studify_config::TwilioConfig {
            account_sid: String::new(),
            auth_token: String::new(),
            phone_number: String::new(),
            weekly_sms_limit: 5,
        }
    });
    let limit = twilio_config.weekly_sms_limit;

    let transport = Arc::new(TwilioSmsClient::new(twilio_config));
    let log = SqlSmsLogRepository::new(db_client);
    let sender = Arc::new(LimitedSmsSender::new(log, transport, tz, limit));

    info!("SMS routes initialized");

    let state = Arc::new(SmsState { sender });

    Router::new()
        .route("/sms/send", post(send_sms_handler))
        .with_state(state)
}
