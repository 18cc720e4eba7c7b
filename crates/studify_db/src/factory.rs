//! Factory for creating database clients

use crate::client::DbClient;
use crate::error::DbError;
use std::sync::Arc;
use studify_config::{AppConfig, DatabaseConfig};
use tracing::debug;

/// Factory for creating database clients from the different configuration
/// sources.
#[derive(Debug, Clone)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a new database client from an application configuration.
    pub async fn from_app_config(&self, config: &Arc<AppConfig>) -> Result<DbClient, DbError> {
        debug!("Creating database client from application configuration");

        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        self.from_db_config(db_config).await
    }

    /// Create a new database client from a database configuration section.
    pub async fn from_db_config(&self, db_config: &DatabaseConfig) -> Result<DbClient, DbError> {
        DbClient::from_config(db_config).await
    }

    /// Create a new database client from a database URL.
    pub async fn from_url(&self, db_url: &str) -> Result<DbClient, DbError> {
        DbClient::from_url(db_url).await
    }
}

impl Default for DbClientFactory {
    fn default() -> Self {
        Self::new()
    }
}
