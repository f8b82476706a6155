//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When unset, sessions and preferences live in memory only.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub scorer_seed: u64,
    /// Upper bound for one detection or summarization request.
    pub request_timeout: Duration,
    /// Upper bound for producing one chat reply.
    pub chat_timeout: Duration,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    /// How long a session's request slots may sit unused before they are dropped.
    pub workspace_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            log_level: Level::INFO,
            scorer_seed: 0,
            request_timeout: Duration::from_secs(30),
            chat_timeout: Duration::from_secs(10),
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origin: "http://localhost:3000".to_string(),
            workspace_idle: Duration::from_secs(60 * 60),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", defaults.bind_address)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        // --- Engine Settings ---
        let scorer_seed = parse_or(&lookup, "SCORER_SEED", defaults.scorer_seed)?;
        let request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?);
        let chat_timeout = Duration::from_secs(parse_or(
            &lookup,
            "CHAT_TIMEOUT_SECS",
            defaults.chat_timeout.as_secs(),
        )?);
        if request_timeout.is_zero() || chat_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS/CHAT_TIMEOUT_SECS".to_string(),
                "timeouts must be greater than zero".to_string(),
            ));
        }

        let workspace_idle = Duration::from_secs(parse_or(
            &lookup,
            "WORKSPACE_IDLE_SECS",
            defaults.workspace_idle.as_secs(),
        )?);
        if workspace_idle.is_zero() {
            return Err(ConfigError::InvalidValue(
                "WORKSPACE_IDLE_SECS".to_string(),
                "the idle limit must be greater than zero".to_string(),
            ));
        }

        // --- HTTP Settings ---
        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            scorer_seed,
            request_timeout,
            chat_timeout,
            max_upload_bytes,
            cors_origin,
            workspace_idle,
        })
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}
