//! crates/news_guardian_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry serde derives so the service layer can put them on the
//! wire as-is, but they know nothing about HTTP or storage.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Submissions and Payloads
//=========================================================================================

/// Where a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Text,
    File,
    Link,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Text => "text",
            SourceKind::File => "file",
            SourceKind::Link => "link",
        }
    }
}

/// An uploaded file as received from the client. The bytes are never parsed here.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The raw shape of a user submission: a kind plus whichever field that kind needs.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub kind: Option<SourceKind>,
    pub text: Option<String>,
    pub file: Option<FileHandle>,
    pub url: Option<String>,
}

impl SubmissionInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some(SourceKind::Text),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn file(file: FileHandle) -> Self {
        Self {
            kind: Some(SourceKind::File),
            file: Some(file),
            ..Default::default()
        }
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self {
            kind: Some(SourceKind::Link),
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// The normalized, engine-ready representation of a submission.
///
/// `raw_text` is always populated; exactly one origin is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    pub source_kind: SourceKind,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

impl ContentPayload {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::Text,
            raw_text: text.into(),
            original_filename: None,
            original_url: None,
        }
    }

    /// Size of the normalized text in bytes.
    pub fn byte_len(&self) -> usize {
        self.raw_text.len()
    }
}

//=========================================================================================
// Detection
//=========================================================================================

/// A related article surfaced alongside a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub title: String,
    pub source_name: String,
    pub url: String,
    pub match_confidence: u8,
}

/// Coarse bucket for a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Moderate,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            90..=u8::MAX => ConfidenceBand::High,
            70..=89 => ConfidenceBand::Moderate,
            _ => ConfidenceBand::Low,
        }
    }
}

/// The structured output of the detection engine for one submission.
///
/// `confidence` is always the confidence in the stated label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionVerdict {
    pub is_fake: bool,
    pub confidence: u8,
    pub band: ConfidenceBand,
    pub rationale: String,
    pub evidence: Vec<EvidenceItem>,
}

//=========================================================================================
// Summarization
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// The news categories the platform files articles under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Education,
    Politics,
    Medical,
    Farming,
    CyberCrime,
    International,
    General,
}

impl NewsCategory {
    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::Education => "Educational News",
            NewsCategory::Politics => "Politics News",
            NewsCategory::Medical => "Medical News",
            NewsCategory::Farming => "Farming News",
            NewsCategory::CyberCrime => "Cyber Crime",
            NewsCategory::International => "International News",
            NewsCategory::General => "General News",
        }
    }

    /// The wire identifier, as serde writes it.
    pub fn id(&self) -> &'static str {
        match self {
            NewsCategory::Education => "education",
            NewsCategory::Politics => "politics",
            NewsCategory::Medical => "medical",
            NewsCategory::Farming => "farming",
            NewsCategory::CyberCrime => "cyber_crime",
            NewsCategory::International => "international",
            NewsCategory::General => "general",
        }
    }

    /// Parses a category identifier, ignoring case, separators and surrounding whitespace,
    /// so `cybercrime`, `cyber_crime` and `Cyber-Crime` all name the same category.
    pub fn from_id(id: &str) -> Option<Self> {
        let folded: String = id
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "education" => Some(NewsCategory::Education),
            "politics" => Some(NewsCategory::Politics),
            "medical" => Some(NewsCategory::Medical),
            "farming" => Some(NewsCategory::Farming),
            "cybercrime" => Some(NewsCategory::CyberCrime),
            "international" => Some(NewsCategory::International),
            "general" => Some(NewsCategory::General),
            _ => None,
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A headline in the news feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: NewsCategory,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

/// A language a summary can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Bn,
    Te,
    Mr,
    Ta,
    Gu,
    Kn,
    Ml,
    Pa,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::En,
        Language::Hi,
        Language::Bn,
        Language::Te,
        Language::Mr,
        Language::Ta,
        Language::Gu,
        Language::Kn,
        Language::Ml,
        Language::Pa,
    ];

    /// Looks up a language by its ISO 639-1 code, ignoring case and surrounding whitespace.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
            Language::Te => "te",
            Language::Mr => "mr",
            Language::Ta => "ta",
            Language::Gu => "gu",
            Language::Kn => "kn",
            Language::Ml => "ml",
            Language::Pa => "pa",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Bn => "Bengali",
            Language::Te => "Telugu",
            Language::Mr => "Marathi",
            Language::Ta => "Tamil",
            Language::Gu => "Gujarati",
            Language::Kn => "Kannada",
            Language::Ml => "Malayalam",
            Language::Pa => "Punjabi",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी",
            Language::Bn => "বাংলা",
            Language::Te => "తెలుగు",
            Language::Mr => "मराठी",
            Language::Ta => "தமிழ்",
            Language::Gu => "ગુજરાતી",
            Language::Kn => "ಕನ್ನಡ",
            Language::Ml => "മലയാളം",
            Language::Pa => "ਪੰਜਾਬੀ",
        }
    }
}

/// The output of the summarization engine for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub title: String,
    pub bullet_sentences: Vec<String>,
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
    pub category: NewsCategory,
    pub language: Language,
    pub word_count: usize,
    pub reading_time_minutes: usize,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Bot,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub author: Author,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

//=========================================================================================
// Session and Preferences
//=========================================================================================

/// The signed-in user, as owned by whatever authenticated them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub is_authenticated: bool,
    pub name: String,
    pub email: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub news_updates: bool,
    pub security_alerts: bool,
    pub marketing: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            news_updates: true,
            security_alerts: true,
            marketing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearancePreferences {
    pub theme: Theme,
    pub language: Language,
    pub font_size: FontSize,
    pub animations: bool,
}

impl Default for AppearancePreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: Language::En,
            font_size: FontSize::Medium,
            animations: true,
        }
    }
}

/// Per-user settings persisted by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub notifications: NotificationPreferences,
    pub appearance: AppearancePreferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_lookup_ignores_case_and_whitespace() {
        assert_eq!(Language::from_code(" HI "), Some(Language::Hi));
        assert_eq!(Language::from_code("pa"), Some(Language::Pa));
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn confidence_bands_follow_thresholds() {
        assert_eq!(ConfidenceBand::from_confidence(100), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(90), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(89), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_confidence(70), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_confidence(69), ConfidenceBand::Low);
    }

    #[test]
    fn category_ids_accept_common_spellings() {
        assert_eq!(NewsCategory::from_id("cybercrime"), Some(NewsCategory::CyberCrime));
        assert_eq!(NewsCategory::from_id(" Cyber-Crime "), Some(NewsCategory::CyberCrime));
        assert_eq!(NewsCategory::from_id("POLITICS"), Some(NewsCategory::Politics));
        assert_eq!(NewsCategory::from_id("sports"), None);
        assert_eq!(NewsCategory::from_id(""), None);
    }

    #[test]
    fn category_id_matches_its_wire_form() {
        let wire = serde_json::to_value(NewsCategory::CyberCrime).unwrap();
        assert_eq!(wire, serde_json::json!(NewsCategory::CyberCrime.id()));
        assert_eq!(NewsCategory::from_id(NewsCategory::CyberCrime.id()), Some(NewsCategory::CyberCrime));
    }

    #[test]
    fn preferences_fill_missing_fields_with_defaults() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"appearance":{"theme":"dark","language":"ta"}}"#).unwrap();
        assert_eq!(prefs.appearance.theme, Theme::Dark);
        assert_eq!(prefs.appearance.language, Language::Ta);
        assert_eq!(prefs.appearance.font_size, FontSize::Medium);
        assert!(prefs.notifications.security_alerts);
        assert!(!prefs.notifications.marketing);
    }
}
