//! Infrastructure-level error handling

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn database_connection(message: impl Into<String>) -> Self {
        Self::DatabaseConnection {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Migration(_) => "MIGRATION_ERROR",
            AppError::DatabaseConnection { .. } => "DATABASE_UNAVAILABLE",
            AppError::Configuration { .. } => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_messages_line_up() {
        let err = AppError::database_connection("pool timed out");
        assert_eq!(err.error_code(), "DATABASE_UNAVAILABLE");
        assert_eq!(err.to_string(), "Database connection error: pool timed out");

        let err = AppError::configuration("PORT");
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(err.to_string(), "Configuration error: PORT");
    }
}
