//! crates/news_guardian_core/src/error.rs
//!
//! The error type shared by every engine and the request pipeline built on top of them.
//! None of these are fatal: each one is surfaced to the user with a retry affordance.

use std::time::Duration;

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardianError {
    /// Bad or missing input. The user corrects it and resubmits.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    /// The file or link could not be turned into text.
    #[error("Could not extract content: {0}")]
    Extraction(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    /// Another request is already in flight for this session.
    #[error("A request is already in progress")]
    Busy,

    /// The request was reset or abandoned before it completed.
    #[error("The request was cancelled")]
    Cancelled,

    #[error("The request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unauthorized")]
    Unauthorized,
}

impl GuardianError {
    /// A stable, machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GuardianError::Validation(_) => "validation",
            GuardianError::UnsupportedLanguage(_) => "unsupported_language",
            GuardianError::Extraction(_) => "extraction",
            GuardianError::Analysis(_) => "analysis",
            GuardianError::Summarization(_) => "summarization",
            GuardianError::Busy => "busy",
            GuardianError::Cancelled => "cancelled",
            GuardianError::Timeout(_) => "timeout",
            GuardianError::Unauthorized => "unauthorized",
        }
    }

    /// Every kind can be retried; an unauthorized caller retries after signing in.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

impl From<PortError> for GuardianError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Extraction(msg) => GuardianError::Extraction(msg),
            PortError::Unauthorized => GuardianError::Unauthorized,
            PortError::NotFound(msg) => GuardianError::Extraction(msg),
            PortError::Unexpected(msg) => GuardianError::Extraction(msg),
        }
    }
}

/// A convenience type alias for `Result<T, GuardianError>`.
pub type GuardianResult<T> = Result<T, GuardianError>;
