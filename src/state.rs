use shared::{Config, DatabaseService};
use sqlx::PgPool;
use std::time::Instant;
use tracing::info;

/// Estado compartido de la aplicación: pool de PostgreSQL y configuración cargada
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = crate::db::create_db_pool(&config.database).await?;
        info!(
            max_connections = config.database.max_connections,
            "✅ Database pool ready"
        );
        Ok(Self::from_parts(db_pool, config))
    }

    /// Estado con un pool que conecta en la primera consulta
    pub fn lazy(config: Config) -> anyhow::Result<Self> {
        let db_pool = DatabaseService::lazy(&config.database)?.into_pool();
        Ok(Self::from_parts(db_pool, config))
    }

    pub fn from_parts(db_pool: PgPool, config: Config) -> Self {
        Self {
            db_pool,
            config,
            started_at: Instant::now(),
        }
    }
}
