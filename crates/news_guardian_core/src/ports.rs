//! crates/news_guardian_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like storage or extractors.

use async_trait::async_trait;
use url::Url;

use crate::domain::{
    ContentPayload, EvidenceItem, FileHandle, NewsCategory, NewsItem, UserPreferences, UserSession,
};
use crate::error::GuardianResult;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, parsing).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Content could not be extracted: {0}")]
    Extraction(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Turns a file or a link into plain text.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract_file(&self, file: &FileHandle) -> PortResult<String>;

    async fn extract_link(&self, url: &Url) -> PortResult<String>;
}

/// Key-value persistence for signed-in users and their preferences.
#[async_trait]
pub trait SessionStore: Send + Sync {
    // --- Sessions ---
    async fn get_session(&self, session_id: &str) -> PortResult<Option<UserSession>>;

    async fn set_session(&self, session_id: &str, session: &UserSession) -> PortResult<()>;

    async fn clear_session(&self, session_id: &str) -> PortResult<()>;

    // --- Preferences ---
    /// Returns the stored preferences, or the defaults if the user never saved any.
    async fn get_preferences(&self, username: &str) -> PortResult<UserPreferences>;

    async fn save_preferences(&self, username: &str, prefs: &UserPreferences) -> PortResult<()>;
}

/// The source of the headline feed.
#[async_trait]
pub trait NewsCatalogue: Send + Sync {
    /// Lists headlines newest first, restricted to `category` when one is given.
    async fn list_news(&self, category: Option<NewsCategory>) -> PortResult<Vec<NewsItem>>;
}

//=========================================================================================
// Scoring Strategy
//=========================================================================================

/// The raw opinion of a scoring strategy about one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// How likely the content is fabricated, from 0 (certainly authentic) to 100.
    pub fake_probability: u8,
    pub evidence: Vec<EvidenceItem>,
}

/// The swappable model behind the analysis engine.
///
/// Implementations must be deterministic for a given configuration so that
/// identical payloads always yield identical verdicts.
pub trait ScoringStrategy: Send + Sync {
    fn assess(&self, payload: &ContentPayload) -> GuardianResult<Assessment>;
}
