//! services/api/src/error.rs
//!
//! Failures that stop the server from starting. Request-time failures are
//! answered through `web::rejection::Rejection` instead.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting to the session database failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Binding the listener or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Startup settings that parse but cannot be applied, such as a bad CORS origin.
    #[error("Startup error: {0}")]
    Internal(String),
}
