//! Feature flag handling for the Studify application.
//!
//! Feature flags are used in two ways:
//!
//! 1. Compile-time feature flags using `#[cfg(feature = "...")]`
//! 2. Runtime feature flags using configuration values
//!
//! This module provides helper functions for checking if features are enabled
//! at runtime based on configuration values.

use std::sync::Arc;
use studify_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
///
/// A feature counts as enabled when its `use_*` flag is set and its
/// configuration section is present.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the push-notification feature is enabled at runtime.
#[cfg(feature = "push")]
pub fn is_push_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_push, config.push.as_ref())
}

/// Check if the SMS feature is enabled at runtime.
#[cfg(feature = "sms")]
pub fn is_sms_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_sms, config.twilio.as_ref())
}

/// Check if the dispatch gateway (periodic scan + broadcast) is enabled at runtime.
#[cfg(feature = "dispatch")]
pub fn is_dispatch_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_dispatch, config.dispatch.as_ref())
}
