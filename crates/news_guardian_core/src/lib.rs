pub mod analysis;
pub mod chat;
pub mod domain;
pub mod error;
pub mod intent;
pub mod normalizer;
pub mod ports;
pub mod summarization;

pub use analysis::{AnalysisEngine, SeededScorer};
pub use chat::{ChatState, Conversation};
pub use domain::{
    Author, ChatMessage, ConfidenceBand, ContentPayload, DetectionVerdict, EvidenceItem,
    FileHandle, Language, NewsCategory, NewsItem, Sentiment, SourceKind, SubmissionInput,
    SummaryResult, UserPreferences, UserSession,
};
pub use error::{GuardianError, GuardianResult};
pub use intent::IntentResponder;
pub use normalizer::{normalize, resolve, ContentSource};
pub use ports::{
    Assessment, ContentExtractor, NewsCatalogue, PortError, PortResult, ScoringStrategy,
    SessionStore,
};
pub use summarization::SummarizationEngine;
