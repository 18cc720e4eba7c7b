//! Authentication module for Firebase Cloud Messaging
//!
//! Generates OAuth2 tokens from a service-account key file so API requests to
//! the FCM HTTP v1 endpoint can be authenticated.

use std::{error::Error, path::Path};
use studify_config::PushConfig;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

/// Obtains an OAuth2 access token for Firebase Cloud Messaging.
///
/// Reads the service account key file from the path in [`PushConfig`] and
/// requests a token with the FCM messaging scope.
///
/// # Errors
///
/// Returns an error if the key path is missing from the config, the key file
/// cannot be read, or the OAuth2 exchange fails.
pub async fn get_push_auth_token(
    config: &PushConfig,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in PushConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    // FCM requires the "https://www.googleapis.com/auth/firebase.messaging" scope
    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    let auth_token = auth
        .token(&["https://www.googleapis.com/auth/firebase.messaging"])
        .await?;
    let access_token = match auth_token.token() {
        Some(token) => token,
        None => {
            return Err("No token available".into());
        }
    };

    Ok(access_token.to_string())
}
