//! Persistencia en PostgreSQL: pool, migraciones y consultas por agregado

pub mod catalogo;
pub mod cedulaciones;
pub mod facturas;

use shared::{AppError, DatabaseConfig, DatabaseService};
use sqlx::PgPool;
use tracing::info;

pub async fn create_db_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let service = DatabaseService::new(config).await?;
    Ok(service.into_pool())
}

/// Aplica las migraciones embebidas (esquema y catálogo inicial)
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("✅ Database migrations applied");
    Ok(())
}
