//! Shared library for the cedulación services
//!
//! - Configuration loaded from the environment
//! - Infrastructure error type
//! - PostgreSQL pool construction and health checks

pub mod config;
pub mod database;
pub mod error;

// Re-export commonly used types
pub use config::{AppConfig, BillingConfig, Config, DatabaseConfig};
pub use database::DatabaseService;
pub use error::{AppError, Result};
