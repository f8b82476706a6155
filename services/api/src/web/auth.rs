//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.
//!
//! Credentials are not verified against an account database: any well-formed
//! email and password sign the user in. What the service does own is the
//! session itself, which lives in the `SessionStore` behind an opaque cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use news_guardian_core::domain::UserSession;
use news_guardian_core::error::GuardianError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::extract::ValidJson;
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;

const SESSION_DAYS: i64 = 30;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

//=========================================================================================
// Cookie Helpers
//=========================================================================================

/// Reads the opaque session id from the `Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

async fn start_session(
    state: &AppState,
    user: UserSession,
    status: StatusCode,
) -> Result<impl IntoResponse, Rejection> {
    let session_id = Uuid::new_v4().to_string();
    state.store.set_session(&session_id, &user).await?;
    info!("Started session {} for '{}'", session_id, user.username);

    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session_id,
        Duration::days(SESSION_DAYS).num_seconds()
    );
    Ok((status, [(header::SET_COOKIE, cookie)], Json(user)))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Sign in with an email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; the session cookie is set"),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, Rejection> {
    let email = req.email.trim();
    let Some((local_part, _)) = email.split_once('@') else {
        return Err(GuardianError::Unauthorized.into());
    };
    if local_part.is_empty() || req.password.is_empty() {
        return Err(GuardianError::Unauthorized.into());
    }

    let user = UserSession {
        is_authenticated: true,
        name: local_part.to_string(),
        email: email.to_string(),
        username: local_part.to_string(),
    };
    start_session(&state, user, StatusCode::OK).await
}

/// POST /auth/register - Create an account and sign in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; the session cookie is set"),
        (status = 400, description = "Missing fields or passwords do not match", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, Rejection> {
    if req.password != req.confirm_password {
        return Err(GuardianError::Validation("Passwords do not match".to_string()).into());
    }
    let email = req.email.trim();
    let username = req.username.trim();
    if !email.contains('@') || req.password.is_empty() || username.is_empty() {
        return Err(GuardianError::Validation(
            "a username, a valid email and a password are required".to_string(),
        )
        .into());
    }
    if let Some(phone) = req.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        info!("Registering '{}' with a phone number ({} chars)", username, phone.len());
    }

    let name = match req.name.trim() {
        "" => username,
        name => name,
    };
    let user = UserSession {
        is_authenticated: true,
        name: name.to_string(),
        email: email.to_string(),
        username: username.to_string(),
    };
    start_session(&state, user, StatusCode::CREATED).await
}

/// POST /auth/logout - Sign out and cancel anything still in flight
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Rejection> {
    let session_id = session_cookie(&headers).ok_or(GuardianError::Unauthorized)?;

    state.store.clear_session(session_id).await?;
    state.drop_workspace(session_id);
    info!("Session {} signed out", session_id);

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}
