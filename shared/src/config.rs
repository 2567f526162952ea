//! Configuration management for the cedulación service

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
    pub port: u16,
    pub max_request_size_mb: u64,
    pub cors_allowed_origins: Vec<String>,
}

/// Reglas de facturación que pueden ajustarse por despliegue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Nombre exacto del servicio del catálogo facturado al registrar una cedulación
    pub servicio_cedula_primera_vez: String,
    pub dias_entrega_estimada: i64,
    pub meses_vencimiento: u32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            servicio_cedula_primera_vez: "Cédula primera vez".to_string(),
            dias_entrega_estimada: 7,
            meses_vencimiento: 1,
        }
    }
}

fn env_or<T>(key: &str, default: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| AppError::configuration(format!("{} has an invalid value '{}': {}", key, raw, e)))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let billing_defaults = BillingConfig::default();

        Ok(Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost:5432/cedulacion_db".to_string()),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", "20")?,
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", "2")?,
                acquire_timeout_seconds: env_or("DATABASE_ACQUIRE_TIMEOUT_SECONDS", "5")?,
                idle_timeout_seconds: env_or("DATABASE_IDLE_TIMEOUT_SECONDS", "300")?,
                max_lifetime_seconds: env_or("DATABASE_MAX_LIFETIME_SECONDS", "1800")?,
                run_migrations: env_or("RUN_MIGRATIONS", "true")?,
            },
            app: AppConfig {
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info".to_string()),
                port: env_or("PORT", "8000")?,
                max_request_size_mb: env_or("MAX_REQUEST_SIZE_MB", "2")?,
                cors_allowed_origins: parse_origins(
                    &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
                ),
            },
            billing: BillingConfig {
                servicio_cedula_primera_vez: env::var("SERVICIO_CEDULA_PRIMERA_VEZ")
                    .unwrap_or(billing_defaults.servicio_cedula_primera_vez),
                dias_entrega_estimada: env_or("DIAS_ENTREGA_ESTIMADA", "7")?,
                meses_vencimiento: env_or("MESES_VENCIMIENTO", "1")?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost:5432/cedulacion_db".to_string(),
                max_connections: 20,
                min_connections: 2,
                acquire_timeout_seconds: 5,
                idle_timeout_seconds: 300,
                max_lifetime_seconds: 1800,
                run_migrations: true,
            },
            app: AppConfig {
                environment: "development".to_string(),
                log_level: "info".to_string(),
                port: 8000,
                max_request_size_mb: 2,
                cors_allowed_origins: Vec::new(),
            },
            billing: BillingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_skips_blanks() {
        let origins = parse_origins(" https://a.gob.pa, ,https://b.gob.pa ,");
        assert_eq!(origins, vec!["https://a.gob.pa", "https://b.gob.pa"]);
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn default_config_is_development() {
        let config = Config::default();
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.billing.dias_entrega_estimada, 7);
        assert_eq!(config.billing.meses_vencimiento, 1);
        assert_eq!(config.billing.servicio_cedula_primera_vez, "Cédula primera vez");
    }

    #[test]
    fn env_or_reports_bad_values() {
        std::env::set_var("CEDULACION_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, AppError> = env_or("CEDULACION_TEST_BAD_PORT", "8000");
        assert!(matches!(result, Err(AppError::Configuration { .. })));

        let fallback: u16 = env_or("CEDULACION_TEST_UNSET_PORT", "8000").unwrap();
        assert_eq!(fallback, 8000);
    }
}
