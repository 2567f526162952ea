//! Database pool for PostgreSQL operations

use crate::{config::DatabaseConfig, error::AppError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: PgPool,
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .max_lifetime(Duration::from_secs(config.max_lifetime_seconds))
        .test_before_acquire(true)
}

impl DatabaseService {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Initializing database connection pool with {} max connections",
            config.max_connections
        );

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::database_connection(format!("Failed to connect to database: {}", e))
            })?;

        let service = Self { pool };
        service.health_check().await?;

        info!("Database connection pool initialized successfully");
        Ok(service)
    }

    /// Builds the pool without opening a connection; the first query connects.
    pub fn lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config)
            .connect_lazy(&config.url)
            .map_err(|e| AppError::configuration(format!("Invalid DATABASE_URL: {}", e)))?;
        Ok(Self { pool })
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }

    /// Round-trips `SELECT 1` and returns the latency in milliseconds
    pub async fn health_check(&self) -> Result<u64> {
        ping(&self.pool).await
    }
}

pub async fn ping(pool: &PgPool) -> Result<u64> {
    let start = Instant::now();
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::database_connection(format!("Database health check failed: {}", e)))?;
    Ok(start.elapsed().as_millis() as u64)
}
