// --- File: crates/studify_sms/src/client.rs ---
//! Twilio REST sender for the secondary text-message channel.

use serde::{Deserialize, Serialize};
use studify_common::services::{BoxFuture, BoxedError, NotificationResult, SmsTransport};
use studify_config::TwilioConfig;
use thiserror::Error;
use tracing::{error, info};

/// Twilio-specific error types.
#[derive(Error, Debug)]
pub enum SmsError {
    /// Error occurred during a Twilio API request
    #[error("Twilio API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Twilio API
    #[error("Twilio API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Missing or incomplete Twilio configuration
    #[error("Twilio configuration missing or incomplete")]
    ConfigError,
}

/// Subset of Twilio's create-message response we care about.
#[derive(Debug, Deserialize, Serialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
    status: Option<String>,
}

/// Twilio SMS client.
pub struct TwilioSmsClient {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioSmsClient {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: studify_common::create_client(),
            config,
        }
    }

    /// Send one text message via Twilio's Messages endpoint.
    pub async fn send(&self, to: &str, body: &str) -> Result<NotificationResult, SmsError> {
        if self.config.account_sid.is_empty() || self.config.auth_token.is_empty() {
            return Err(SmsError::ConfigError);
        }

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let params = [
            ("To", to),
            ("From", self.config.phone_number.as_str()),
            ("Body", body),
        ];

        info!("Sending SMS to {}", to);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            // Bubble up the Twilio JSON error so it can be debugged
            error!("Twilio returned {}: {}", status, body_text);
            return Err(SmsError::ApiError {
                status_code: status.as_u16(),
                message: body_text,
            });
        }

        let parsed: TwilioMessageResponse = resp.json().await.unwrap_or(TwilioMessageResponse {
            sid: None,
            status: None,
        });

        Ok(NotificationResult {
            id: parsed.sid.unwrap_or_default(),
            status: parsed.status.unwrap_or_else(|| "queued".to_string()),
        })
    }
}

impl SmsTransport for TwilioSmsClient {
    fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, BoxedError> {
        // Clone the values to avoid lifetime issues
        let to = to.to_string();
        let body = body.to_string();

        Box::pin(async move {
            self.send(&to, &body)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}
