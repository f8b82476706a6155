//! services/api/src/web/router.rs
//!
//! Assembles the complete Axum application: public routes, cookie-protected
//! routes, body limits, CORS, and the Swagger UI.

use crate::error::ApiError;
use crate::web::{auth, middleware::require_auth, profile, rest, state::AppState, ws_handler};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/news", get(rest::news_handler))
        .route("/languages", get(rest::languages_handler))
        .route("/health", get(rest::health_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile_handler).put(profile::update_profile_handler),
        )
        .route(
            "/profile/preferences",
            get(profile::get_preferences_handler).put(profile::save_preferences_handler),
        )
        .route("/detect", post(rest::detect_handler))
        .route("/detect/upload", post(rest::detect_upload_handler))
        .route("/detect/latest", get(rest::latest_verdict_handler))
        .route("/detect/reset", post(rest::reset_detection_handler))
        .route("/summarize", post(rest::summarize_handler))
        .route("/summarize/upload", post(rest::summarize_upload_handler))
        .route("/summarize/latest", get(rest::latest_summary_handler))
        .route("/summarize/reset", post(rest::reset_summary_handler))
        .route("/ws/chat", get(ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi())))
}
