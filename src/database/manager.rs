use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::database::handle_cache::{ConnectError, Connector, HandleCache};
use crate::database::schema;

/// Errors from database access on top of the shared pool
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Acquire(#[from] ConnectError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the Postgres pool and bootstraps the schema before it is handed out
pub struct PgConnector {
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            acquire_timeout: Duration::from_secs(config.connection_timeout),
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    fn validate(&self, location: &str) -> Result<(), ConnectError> {
        let url = url::Url::parse(location).map_err(|_| ConnectError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            _ => Err(ConnectError::InvalidDatabaseUrl),
        }
    }

    async fn connect(&self, location: &str) -> Result<PgPool, ConnectError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(location)
            .await?;

        // A pool only counts as ready once the tables exist
        schema::bootstrap(&pool).await?;
        Ok(pool)
    }
}

/// Owner of the process-wide database pool.
///
/// Constructed once in `main` and shared through `AppState`.
pub struct DatabaseManager {
    cache: HandleCache<PgConnector>,
}

impl DatabaseManager {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            cache: HandleCache::new(PgConnector::new(config), config.url.clone()),
        }
    }

    /// Get the shared pool, connecting on first use
    pub async fn pool(&self) -> Result<PgPool, DatabaseError> {
        Ok(self.cache.acquire().await?)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    pub async fn is_ready(&self) -> bool {
        self.cache.is_ready().await
    }

    /// Close the pool if one was opened (e.g., on shutdown)
    pub async fn close(&self) {
        if self.cache.is_ready().await {
            if let Ok(pool) = self.cache.acquire().await {
                pool.close().await;
                tracing::info!("Closed database pool");
            }
        }
    }
}
