//! services/api/src/adapters/extractor.rs
//!
//! A dependency-free implementation of the `ContentExtractor` port.
//!
//! Plain-text uploads are decoded directly. Links are not fetched: the article
//! headline is recovered from the URL's path, which is what the scoring and
//! summarization engines need to produce a stable result for the same link.

use async_trait::async_trait;
use news_guardian_core::domain::FileHandle;
use news_guardian_core::ports::{ContentExtractor, PortError, PortResult};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct LocalExtractor;

impl LocalExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentExtractor for LocalExtractor {
    async fn extract_file(&self, file: &FileHandle) -> PortResult<String> {
        let extension = file
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        debug!(
            "Extracting {} byte(s) from '{}' ({:?})",
            file.bytes.len(),
            file.filename,
            file.content_type
        );

        match extension.as_str() {
            "txt" => String::from_utf8(file.bytes.to_vec()).map_err(|e| {
                PortError::Extraction(format!("'{}' is not valid UTF-8 text: {}", file.filename, e))
            }),
            other => Err(PortError::Extraction(format!(
                "text extraction from .{} files is not available on this server",
                other
            ))),
        }
    }

    async fn extract_link(&self, url: &Url) -> PortResult<String> {
        headline_from_path(url).ok_or_else(|| {
            PortError::Extraction(format!("no article headline could be read from {}", url))
        })
    }
}

/// Builds a headline from the most descriptive path segment of a URL.
///
/// `https://news.example/world/2024/leaders-agree-on-climate-pact.html`
/// becomes `Leaders agree on climate pact.`
fn headline_from_path(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .map(|s| s.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(s))
        .filter_map(|stem| {
            let words: Vec<&str> = stem
                .split(['-', '_', '+'])
                .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
                .collect();
            (words.len() >= 2).then_some(words)
        })
        .last()?;

    let mut headline = segment.join(" ").to_lowercase();
    if let Some(first) = headline.get(..1) {
        headline = format!("{}{}", first.to_uppercase(), &headline[1..]);
    }
    headline.push('.');
    Some(headline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str, body: &'static [u8]) -> FileHandle {
        FileHandle {
            filename: name.to_string(),
            content_type: None,
            bytes: Bytes::from_static(body),
        }
    }

    #[tokio::test]
    async fn text_files_are_decoded() {
        let text = LocalExtractor::new()
            .extract_file(&file("story.TXT", b"Breaking news today."))
            .await
            .unwrap();
        assert_eq!(text, "Breaking news today.");
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_extraction_error() {
        let err = LocalExtractor::new()
            .extract_file(&file("story.txt", &[0xff, 0xfe, 0x00]))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Extraction(_)));
    }

    #[tokio::test]
    async fn binary_formats_are_rejected() {
        let err = LocalExtractor::new()
            .extract_file(&file("scan.pdf", b"%PDF-1.7"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains(".pdf"));
    }

    #[tokio::test]
    async fn links_yield_a_headline_from_the_slug() {
        let url = Url::parse("https://news.example/world/2024/leaders-agree-on-climate-pact.html")
            .unwrap();
        let text = LocalExtractor::new().extract_link(&url).await.unwrap();
        assert_eq!(text, "Leaders agree on climate pact.");
    }

    #[tokio::test]
    async fn links_without_a_slug_fail() {
        let url = Url::parse("https://news.example/").unwrap();
        assert!(LocalExtractor::new().extract_link(&url).await.is_err());

        let url = Url::parse("https://news.example/2024/10/19").unwrap();
        assert!(LocalExtractor::new().extract_link(&url).await.is_err());
    }
}
