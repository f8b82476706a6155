//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use news_guardian_core::error::GuardianError;
use std::sync::Arc;
use tracing::{debug, error};

use crate::web::auth::session_cookie;
use crate::web::rejection::Rejection;
use crate::web::state::{AppState, AuthContext};

/// Middleware that validates the session cookie and loads the signed-in user.
///
/// If valid, inserts an `AuthContext` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let unauthorized = || Rejection::Guardian(GuardianError::Unauthorized).into_response();

    // 1. Parse session ID from the cookie header
    let Some(session_id) = session_cookie(req.headers()).map(str::to_string) else {
        debug!("Rejected request to {} without a session cookie", req.uri().path());
        return unauthorized();
    };

    // 2. Look the session up in the store
    let user = match state.store.get_session(&session_id).await {
        Ok(Some(user)) if user.is_authenticated => user,
        Ok(_) => return unauthorized(),
        Err(e) => {
            error!("Failed to load session {}: {:?}", session_id, e);
            return Rejection::from(e).into_response();
        }
    };

    // 3. Insert the auth context into request extensions and continue
    req.extensions_mut().insert(AuthContext { session_id, user });
    next.run(req).await
}
