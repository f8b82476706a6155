//! services/api/src/web/extract.rs
//!
//! Request extractors whose failures answer with the JSON error body instead of
//! Axum's plain-text rejections.

use crate::web::rejection::Rejection;
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;
use news_guardian_core::error::GuardianError;

/// `Json<T>` whose malformed or mistyped bodies become `Validation` errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(GuardianError::Validation(rejection.body_text()).into()),
        }
    }
}
