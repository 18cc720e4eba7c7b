// --- File: crates/studify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via APP_DATABASE__URL or DATABASE_URL
}

// --- Push (FCM) Config ---
// Holds non-secret push config. The service-account key lives on disk at key_path.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PushConfig {
    pub project_id: Option<String>,
    pub key_path: Option<String>,
}

// --- Twilio Config ---
// Holds non-secret Twilio config. Secrets loaded directly from env vars.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwilioConfig {
    pub account_sid: String, // Loaded via APP_TWILIO__ACCOUNT_SID or TWILIO_ACCOUNT_SID
    pub auth_token: String,  // Loaded via APP_TWILIO__AUTH_TOKEN or TWILIO_AUTH_TOKEN
    pub phone_number: String,
    #[serde(default = "default_weekly_sms_limit")]
    pub weekly_sms_limit: i64,
}

fn default_weekly_sms_limit() -> i64 {
    5
}

// --- Dispatch Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
}

fn default_scan_interval_secs() -> u64 {
    300
}

fn default_horizon_days() -> u32 {
    7
}

fn default_chunk_size() -> usize {
    500
}

fn default_scan_concurrency() -> usize {
    8
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            horizon_days: default_horizon_days(),
            chunk_size: default_chunk_size(),
            scan_concurrency: default_scan_concurrency(),
        }
    }
}

// --- Cleanup Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CleanupConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,
}

fn default_retention_days() -> u32 {
    30
}

fn default_cleanup_interval_secs() -> u64 {
    86_400
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_timezone() -> String {
    "Europe/Zurich".to_string()
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // IANA timezone used for course times and the SMS week boundary
    #[serde(default = "default_timezone")]
    pub timezone: String,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_push: bool,
    #[serde(default)]
    pub use_sms: bool,
    #[serde(default)]
    pub use_dispatch: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>, // Central DB config
    #[serde(default)]
    pub push: Option<PushConfig>,
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,
    #[serde(default)]
    pub dispatch: Option<DispatchConfig>,
    #[serde(default)]
    pub cleanup: Option<CleanupConfig>,
}
