//! services/api/src/web/profile.rs
//!
//! Profile and settings endpoints for the signed-in user.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use news_guardian_core::domain::{Language, UserPreferences};
use news_guardian_core::error::GuardianError;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::extract::ValidJson;
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::{AppState, AuthContext};

#[derive(Deserialize, ToSchema)]
pub struct ProfileUpdate {
    pub name: String,
}

/// GET /profile - The signed-in user
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The current user session"),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn get_profile_handler(Extension(auth): Extension<AuthContext>) -> impl IntoResponse {
    Json(auth.user)
}

/// PUT /profile - Change the display name
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "The updated user session"),
        (status = 400, description = "Empty name", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> Result<impl IntoResponse, Rejection> {
    let name = update.name.trim();
    if name.is_empty() {
        return Err(GuardianError::Validation("name must not be empty".to_string()).into());
    }

    let mut user = auth.user;
    user.name = name.to_string();
    state.store.set_session(&auth.session_id, &user).await?;
    Ok(Json(user))
}

/// GET /profile/preferences - Notification and appearance settings
#[utoipa::path(
    get,
    path = "/profile/preferences",
    responses(
        (status = 200, description = "Stored preferences, or the defaults"),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn get_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, Rejection> {
    let prefs = state.store.get_preferences(&auth.user.username).await?;
    Ok(Json(prefs))
}

/// PUT /profile/preferences - Replace notification and appearance settings
///
/// Omitted fields fall back to their defaults.
#[utoipa::path(
    put,
    path = "/profile/preferences",
    request_body(content_type = "application/json", description = "A full or partial preferences object."),
    responses(
        (status = 200, description = "The saved preferences"),
        (status = 400, description = "Malformed preferences or unsupported language", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn save_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(raw): ValidJson<Value>,
) -> Result<impl IntoResponse, Rejection> {
    let prefs = parse_preferences(raw)?;
    state
        .store
        .save_preferences(&auth.user.username, &prefs)
        .await?;
    info!(
        "Saved preferences for '{}' (language {})",
        auth.user.username,
        prefs.appearance.language.code()
    );
    Ok(Json(prefs))
}

/// Checks the preferred language by code first so an unknown one is reported as such.
fn parse_preferences(raw: Value) -> Result<UserPreferences, GuardianError> {
    if let Some(code) = raw.pointer("/appearance/language") {
        let code = code.as_str().unwrap_or_default();
        if Language::from_code(code).is_none() {
            return Err(GuardianError::UnsupportedLanguage(code.to_string()));
        }
    }
    serde_json::from_value(raw).map_err(|e| GuardianError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_guardian_core::domain::Theme;
    use serde_json::json;

    #[test]
    fn partial_preferences_fill_in_defaults() {
        let prefs = parse_preferences(json!({ "appearance": { "theme": "dark" } })).unwrap();
        assert_eq!(prefs.appearance.theme, Theme::Dark);
        assert_eq!(prefs.appearance.language, Language::En);
        assert!(prefs.notifications.email);
    }

    #[test]
    fn unknown_languages_are_rejected() {
        let err = parse_preferences(json!({ "appearance": { "language": "xx" } })).unwrap_err();
        assert_eq!(err, GuardianError::UnsupportedLanguage("xx".to_string()));
    }

    #[test]
    fn malformed_values_are_validation_errors() {
        let err = parse_preferences(json!({ "notifications": { "sms": "often" } })).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
