//! services/api/src/adapters/memory.rs
//!
//! An in-process `SessionStore`, used when no `DATABASE_URL` is configured and
//! by the integration tests. Everything is lost on restart.

use async_trait::async_trait;
use news_guardian_core::domain::{UserPreferences, UserSession};
use news_guardian_core::ports::{PortResult, SessionStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, UserSession>>,
    preferences: RwLock<HashMap<String, UserPreferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_session(&self, session_id: &str) -> PortResult<Option<UserSession>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn set_session(&self, session_id: &str, session: &UserSession) -> PortResult<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), session.clone());
        Ok(())
    }

    async fn clear_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn get_preferences(&self, username: &str) -> PortResult<UserPreferences> {
        Ok(self
            .preferences
            .read()
            .await
            .get(username)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_preferences(&self, username: &str, prefs: &UserPreferences) -> PortResult<()> {
        self.preferences
            .write()
            .await
            .insert(username.to_string(), prefs.clone());
        Ok(())
    }
}
