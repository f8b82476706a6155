//! services/api/src/web/rejection.rs
//!
//! Turns pipeline and store failures into JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use news_guardian_core::error::GuardianError;
use news_guardian_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description, safe to show to the user.
    pub error: String,
    /// Machine-readable error kind, e.g. `validation` or `busy`.
    pub kind: String,
    pub retryable: bool,
}

#[derive(Debug)]
pub enum Rejection {
    Guardian(GuardianError),
    /// A storage failure the user cannot fix.
    Internal(String),
}

impl From<GuardianError> for Rejection {
    fn from(err: GuardianError) -> Self {
        Rejection::Guardian(err)
    }
}

impl From<PortError> for Rejection {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Unauthorized => Rejection::Guardian(GuardianError::Unauthorized),
            other => Rejection::Internal(other.to_string()),
        }
    }
}

pub fn status_for(err: &GuardianError) -> StatusCode {
    match err {
        GuardianError::Validation(_) | GuardianError::UnsupportedLanguage(_) => {
            StatusCode::BAD_REQUEST
        }
        GuardianError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GuardianError::Busy | GuardianError::Cancelled => StatusCode::CONFLICT,
        GuardianError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GuardianError::Analysis(_) | GuardianError::Summarization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        GuardianError::Unauthorized => StatusCode::UNAUTHORIZED,
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Rejection::Guardian(err) => (
                status_for(&err),
                ErrorBody {
                    error: err.to_string(),
                    kind: err.kind().to_string(),
                    retryable: err.is_retryable(),
                },
            ),
            Rejection::Internal(detail) => {
                error!("Internal failure while handling request: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "An unexpected internal error occurred".to_string(),
                        kind: "internal".to_string(),
                        retryable: true,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(
            status_for(&GuardianError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&GuardianError::UnsupportedLanguage("xx".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&GuardianError::Extraction("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(&GuardianError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&GuardianError::Timeout(Duration::from_secs(1))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&GuardianError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_failures_are_internal() {
        let rejection = Rejection::from(PortError::Unexpected("db down".into()));
        assert!(matches!(rejection, Rejection::Internal(_)));
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
