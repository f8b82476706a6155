//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the detection and summarization endpoints and
//! the master definition for the OpenAPI specification.

use crate::web::extract::ValidJson;
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::{AppState, AuthContext};
use crate::web::{auth, pipeline, profile};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use news_guardian_core::domain::{
    FileHandle, Language, NewsCategory, NewsItem, SourceKind, SubmissionInput,
};
use news_guardian_core::error::GuardianError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::logout_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        profile::get_preferences_handler,
        profile::save_preferences_handler,
        detect_handler,
        detect_upload_handler,
        latest_verdict_handler,
        reset_detection_handler,
        summarize_handler,
        summarize_upload_handler,
        latest_summary_handler,
        reset_summary_handler,
        news_handler,
        languages_handler,
        health_handler,
    ),
    components(
        schemas(
            ErrorBody,
            SubmissionRequest,
            SummarizeRequest,
            LanguageInfo,
            auth::LoginRequest,
            auth::RegisterRequest,
            profile::ProfileUpdate,
        )
    ),
    tags(
        (name = "NewsGuardian API", description = "Fake-news detection, summarization and account endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// A text or link submission. Files go through the `/upload` endpoints instead.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmissionRequest {
    /// One of `text`, `file` or `link`.
    #[schema(value_type = Option<String>, example = "text")]
    pub kind: Option<SourceKind>,
    pub text: Option<String>,
    pub url: Option<String>,
}

impl From<SubmissionRequest> for SubmissionInput {
    fn from(req: SubmissionRequest) -> Self {
        SubmissionInput {
            kind: req.kind,
            text: req.text,
            file: None,
            url: req.url,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummarizeRequest {
    pub submission: SubmissionRequest,
    /// ISO 639-1 code of the summary language.
    #[serde(default = "default_language")]
    #[schema(example = "en")]
    pub language: String,
}

fn default_language() -> String {
    Language::En.code().to_string()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewsQuery {
    /// A category id such as `politics` or `cybercrime`. All categories when absent.
    pub category: Option<String>,
}

//=========================================================================================
// Multipart Helpers
//=========================================================================================

struct Upload {
    file: FileHandle,
    language: Option<String>,
}

/// Reads a `file` part and an optional `language` part from a multipart form.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, Rejection> {
    let mut multipart = multipart.map_err(|e| {
        GuardianError::Validation(format!("Expected a multipart form: {}", e.body_text()))
    })?;
    let invalid = |e: axum::extract::multipart::MultipartError| {
        Rejection::from(GuardianError::Validation(format!(
            "Failed to read multipart data: {}",
            e.body_text()
        )))
    };

    let mut file = None;
    let mut language = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid)?;
                file = Some(FileHandle {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("language") => language = Some(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        GuardianError::Validation("Multipart form must include a file".to_string())
    })?;
    Ok(Upload { file, language })
}

//=========================================================================================
// Detection Handlers
//=========================================================================================

/// Analyze a text or link submission for signs of fabrication.
///
/// Identical submissions always receive identical verdicts.
#[utoipa::path(
    post,
    path = "/detect",
    request_body = SubmissionRequest,
    responses(
        (status = 200, description = "The detection verdict"),
        (status = 400, description = "Invalid submission", body = ErrorBody),
        (status = 409, description = "A detection is already in progress", body = ErrorBody),
        (status = 422, description = "No text could be extracted", body = ErrorBody),
        (status = 504, description = "The analysis timed out", body = ErrorBody)
    )
)]
pub async fn detect_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<SubmissionRequest>,
) -> Result<impl IntoResponse, Rejection> {
    info!("Detection requested by session {}", auth.session_id);
    let workspace = state.workspace(&auth.session_id);
    let verdict = pipeline::run_detection(&state, &workspace, req.into()).await?;
    Ok(Json(verdict))
}

/// Analyze an uploaded document.
#[utoipa::path(
    post,
    path = "/detect/upload",
    request_body(content_type = "multipart/form-data", description = "A `file` part holding the document."),
    responses(
        (status = 200, description = "The detection verdict"),
        (status = 400, description = "Missing or unsupported file", body = ErrorBody),
        (status = 409, description = "A detection is already in progress", body = ErrorBody),
        (status = 422, description = "No text could be extracted", body = ErrorBody)
    )
)]
pub async fn detect_upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Rejection> {
    let upload = read_upload(multipart).await?;
    info!(
        "Detection of upload '{}' requested by session {}",
        upload.file.filename, auth.session_id
    );
    let workspace = state.workspace(&auth.session_id);
    let verdict =
        pipeline::run_detection(&state, &workspace, SubmissionInput::file(upload.file)).await?;
    Ok(Json(verdict))
}

/// The last verdict of this session, or `null`.
#[utoipa::path(
    get,
    path = "/detect/latest",
    responses((status = 200, description = "The last committed verdict, or null"))
)]
pub async fn latest_verdict_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> impl IntoResponse {
    Json(state.workspace(&auth.session_id).detection.latest())
}

/// Cancel a pending detection and clear the last verdict.
#[utoipa::path(
    post,
    path = "/detect/reset",
    responses((status = 204, description = "The detection slot was reset"))
)]
pub async fn reset_detection_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> impl IntoResponse {
    state.workspace(&auth.session_id).detection.reset();
    info!("Detection reset by session {}", auth.session_id);
    StatusCode::NO_CONTENT
}

//=========================================================================================
// Summarization Handlers
//=========================================================================================

/// Summarize a text or link submission in one of the supported languages.
#[utoipa::path(
    post,
    path = "/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "The summary"),
        (status = 400, description = "Invalid submission or unsupported language", body = ErrorBody),
        (status = 409, description = "A summary is already in progress", body = ErrorBody),
        (status = 422, description = "No text could be extracted", body = ErrorBody),
        (status = 504, description = "Summarization timed out", body = ErrorBody)
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<SummarizeRequest>,
) -> Result<impl IntoResponse, Rejection> {
    info!("Summary requested by session {}", auth.session_id);
    let workspace = state.workspace(&auth.session_id);
    let summary =
        pipeline::run_summary(&state, &workspace, req.submission.into(), req.language).await?;
    Ok(Json(summary))
}

/// Summarize an uploaded document. An optional `language` part selects the language.
#[utoipa::path(
    post,
    path = "/summarize/upload",
    request_body(content_type = "multipart/form-data", description = "A `file` part and an optional `language` part."),
    responses(
        (status = 200, description = "The summary"),
        (status = 400, description = "Missing file or unsupported language", body = ErrorBody),
        (status = 409, description = "A summary is already in progress", body = ErrorBody),
        (status = 422, description = "No text could be extracted", body = ErrorBody)
    )
)]
pub async fn summarize_upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, Rejection> {
    let upload = read_upload(multipart).await?;
    info!(
        "Summary of upload '{}' requested by session {}",
        upload.file.filename, auth.session_id
    );
    let language = upload.language.unwrap_or_else(default_language);
    let workspace = state.workspace(&auth.session_id);
    let summary = pipeline::run_summary(
        &state,
        &workspace,
        SubmissionInput::file(upload.file),
        language,
    )
    .await?;
    Ok(Json(summary))
}

/// The last summary of this session, or `null`.
#[utoipa::path(
    get,
    path = "/summarize/latest",
    responses((status = 200, description = "The last committed summary, or null"))
)]
pub async fn latest_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> impl IntoResponse {
    Json(state.workspace(&auth.session_id).summary.latest())
}

/// Cancel a pending summary and clear the last one.
#[utoipa::path(
    post,
    path = "/summarize/reset",
    responses((status = 204, description = "The summary slot was reset"))
)]
pub async fn reset_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> impl IntoResponse {
    state.workspace(&auth.session_id).summary.reset();
    info!("Summary reset by session {}", auth.session_id);
    StatusCode::NO_CONTENT
}

//=========================================================================================
// Public Handlers
//=========================================================================================

/// The headline feed, newest first, optionally narrowed to one category.
#[utoipa::path(
    get,
    path = "/news",
    params(NewsQuery),
    responses(
        (status = 200, description = "Headlines, newest first"),
        (status = 400, description = "Unknown category", body = ErrorBody)
    )
)]
pub async fn news_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<impl IntoResponse, Rejection> {
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(id) => Some(NewsCategory::from_id(id).ok_or_else(|| {
            GuardianError::Validation(format!("Unknown news category '{}'", id))
        })?),
    };
    let items: Vec<NewsItem> = state.news.list_news(category).await?;
    Ok(Json(items))
}

/// The languages summaries can be requested in.
#[utoipa::path(
    get,
    path = "/languages",
    responses((status = 200, description = "Supported languages", body = [LanguageInfo]))
)]
pub async fn languages_handler() -> impl IntoResponse {
    let languages: Vec<LanguageInfo> = Language::ALL
        .iter()
        .map(|lang| LanguageInfo {
            code: lang.code().to_string(),
            name: lang.name().to_string(),
            native_name: lang.native_name().to_string(),
        })
        .collect();
    Json(languages)
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up"))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
