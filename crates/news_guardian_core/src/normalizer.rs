//! crates/news_guardian_core/src/normalizer.rs
//!
//! Validates a raw submission and, with the help of a `ContentExtractor`,
//! turns it into a `ContentPayload` the engines can consume.

use url::Url;

use crate::domain::{ContentPayload, FileHandle, SourceKind, SubmissionInput};
use crate::error::{GuardianError, GuardianResult};
use crate::ports::ContentExtractor;

/// File extensions the upload form accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 7] = ["txt", "pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// A validated submission whose text may still need extracting.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Text(String),
    File(FileHandle),
    Link(Url),
}

impl ContentSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ContentSource::Text(_) => SourceKind::Text,
            ContentSource::File(_) => SourceKind::File,
            ContentSource::Link(_) => SourceKind::Link,
        }
    }
}

/// Validates a submission. Performs no I/O.
pub fn normalize(input: SubmissionInput) -> GuardianResult<ContentSource> {
    let kind = input
        .kind
        .ok_or_else(|| GuardianError::Validation("submission kind is required".to_string()))?;

    match kind {
        SourceKind::Text => {
            let text = input.text.as_deref().map(str::trim).unwrap_or_default();
            if text.is_empty() {
                return Err(GuardianError::Validation(
                    "text content must not be empty".to_string(),
                ));
            }
            Ok(ContentSource::Text(text.to_string()))
        }
        SourceKind::File => {
            let file = input
                .file
                .ok_or_else(|| GuardianError::Validation("a file is required".to_string()))?;
            validate_file(&file)?;
            Ok(ContentSource::File(file))
        }
        SourceKind::Link => {
            let raw = input.url.as_deref().map(str::trim).unwrap_or_default();
            parse_link(raw).map(ContentSource::Link)
        }
    }
}

/// Resolves a validated submission into a payload with populated text.
pub async fn resolve(
    source: ContentSource,
    extractor: &dyn ContentExtractor,
) -> GuardianResult<ContentPayload> {
    let payload = match source {
        ContentSource::Text(text) => ContentPayload::from_text(text),
        ContentSource::File(file) => {
            let text = extractor.extract_file(&file).await?;
            ContentPayload {
                source_kind: SourceKind::File,
                raw_text: text.trim().to_string(),
                original_filename: Some(file.filename),
                original_url: None,
            }
        }
        ContentSource::Link(url) => {
            let text = extractor.extract_link(&url).await?;
            ContentPayload {
                source_kind: SourceKind::Link,
                raw_text: text.trim().to_string(),
                original_filename: None,
                original_url: Some(url.to_string()),
            }
        }
    };

    if payload.raw_text.is_empty() {
        return Err(GuardianError::Extraction(
            "no readable text was found in the submission".to_string(),
        ));
    }
    Ok(payload)
}

fn validate_file(file: &FileHandle) -> GuardianResult<()> {
    if file.filename.trim().is_empty() {
        return Err(GuardianError::Validation("the file has no name".to_string()));
    }
    if file.bytes.is_empty() {
        return Err(GuardianError::Validation(format!(
            "'{}' is empty",
            file.filename
        )));
    }
    let extension = file
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(GuardianError::Validation(format!(
            "unsupported file type '{}'; accepted: {}",
            file.filename,
            ACCEPTED_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

fn parse_link(raw: &str) -> GuardianResult<Url> {
    if raw.is_empty() {
        return Err(GuardianError::Validation("a URL is required".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|e| GuardianError::Validation(format!("'{}' is not a valid URL: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(GuardianError::Validation(format!(
            "'{}' must be an absolute http(s) URL",
            raw
        )));
    }
    Ok(url)
}
