use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, Environment, StoreBackend};

use super::Store;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{label} with this {field} already exists")]
    Duplicate {
        label: &'static str,
        field: &'static str,
    },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Opens the configured store once at startup
pub struct DatabaseManager;

impl DatabaseManager {
    /// Build the store selected by `STORE_BACKEND`, running migrations when enabled
    pub async fn connect(config: &AppConfig) -> Result<Store, DatabaseError> {
        match config.database.backend {
            StoreBackend::Memory => {
                if config.environment == Environment::Production {
                    warn!("Memory store selected in production; all records are lost on exit");
                }
                info!("Using in-memory record store");
                Ok(Store::memory())
            }
            StoreBackend::Postgres => {
                let pool = Self::pool(config).await?;
                if config.database.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Store::postgres(pool))
            }
        }
    }

    /// Create the shared connection pool
    pub async fn pool(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .database
            .url
            .as_deref()
            .ok_or_else(|| DatabaseError::ConnectionError("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Connected to {}",
            config.redacted_database_url().unwrap_or_else(|| "database".to_string())
        );
        Ok(pool)
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}
