//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SessionStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Both tables are plain key-value stores: the value column holds the domain
//! struct encoded as JSON.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use news_guardian_core::domain::{UserPreferences, UserSession};
use news_guardian_core::ports::{PortError, PortResult, SessionStore};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SessionStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct StoredValue {
    data: String,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

impl StoredValue {
    fn decode<T: DeserializeOwned>(self) -> PortResult<T> {
        serde_json::from_str(&self.data).map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

fn encode<T: Serialize>(value: &T) -> PortResult<String> {
    serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for PgStore {
    async fn get_session(&self, session_id: &str) -> PortResult<Option<UserSession>> {
        let record = sqlx::query_as::<_, StoredValue>(
            "SELECT data, updated_at FROM user_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(StoredValue::decode).transpose()
    }

    async fn set_session(&self, session_id: &str, session: &UserSession) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_sessions (session_id, data) VALUES ($1, $2) \
             ON CONFLICT (session_id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(session_id)
        .bind(encode(session)?)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn clear_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_preferences(&self, username: &str) -> PortResult<UserPreferences> {
        let record = sqlx::query_as::<_, StoredValue>(
            "SELECT data, updated_at FROM user_preferences WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(record) => record.decode(),
            None => Ok(UserPreferences::default()),
        }
    }

    async fn save_preferences(&self, username: &str, prefs: &UserPreferences) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_preferences (username, data) VALUES ($1, $2) \
             ON CONFLICT (username) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(username)
        .bind(encode(prefs)?)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}
