//! crates/news_guardian_core/src/summarization.rs
//!
//! An extractive summarizer: it keeps the most representative sentences of an
//! article in their original order and derives the title, key points, sentiment
//! and category from the text. Summaries are not translated; the requested
//! language is validated and recorded on the result.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::domain::{ContentPayload, Language, NewsCategory, Sentiment, SummaryResult};
use crate::error::{GuardianError, GuardianResult};

pub const MAX_BULLETS: usize = 4;
pub const MAX_KEY_POINTS: usize = 5;
pub const WORDS_PER_MINUTE: usize = 200;

const TITLE_WORDS: usize = 12;
const KEY_POINT_WORDS: usize = 8;
const TERMINATORS: &[char] = &['.', '!', '?', '।'];

/// Words that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "etc", "inc", "ltd", "co", "corp",
    "gen", "gov", "sen", "rep", "no", "fig", "approx", "dept",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "him", "his", "how", "its", "may", "new", "now", "say",
    "she", "that", "this", "with", "from", "they", "them", "then", "than", "there", "their",
    "were", "what", "when", "where", "which", "while", "who", "will", "would", "been", "being",
    "into", "about", "after", "also", "over", "said", "some", "such", "these", "those", "very",
];

const POSITIVE_TERMS: &[&str] = &[
    "achieve", "achieved", "achievement", "agreement", "benefit", "boost", "breakthrough",
    "celebrate", "gain", "gains", "growth", "historic", "improve", "improved", "innovation",
    "landmark", "peace", "positive", "praised", "progress", "recovery", "safe", "success",
    "successful", "support", "welcome", "win", "wins",
];

const NEGATIVE_TERMS: &[&str] = &[
    "arrested", "attack", "breach", "collapse", "conflict", "corruption", "crisis", "death",
    "deaths", "decline", "disaster", "fail", "failed", "failure", "fear", "fraud", "hacked",
    "injured", "killed", "loss", "losses", "negative", "outbreak", "scam", "shortage", "threat",
    "violence", "war", "warning",
];

/// Keyword sets per category, in tie-breaking order.
const CATEGORY_TERMS: &[(NewsCategory, &[&str])] = &[
    (
        NewsCategory::Education,
        &[
            "school", "schools", "student", "students", "university", "education", "educational",
            "exam", "exams", "teacher", "teachers", "curriculum", "college",
        ],
    ),
    (
        NewsCategory::Politics,
        &[
            "election", "elections", "government", "minister", "parliament", "policy", "vote",
            "voters", "party", "president", "senate", "campaign", "political",
        ],
    ),
    (
        NewsCategory::Medical,
        &[
            "health", "hospital", "doctor", "doctors", "vaccine", "disease", "medical",
            "patients", "virus", "treatment", "medicine",
        ],
    ),
    (
        NewsCategory::Farming,
        &[
            "farmer", "farmers", "farming", "crop", "crops", "harvest", "agriculture",
            "agricultural", "irrigation", "livestock", "monsoon", "fertilizer",
        ],
    ),
    (
        NewsCategory::CyberCrime,
        &[
            "cyber", "cybercrime", "hacker", "hackers", "phishing", "malware", "ransomware",
            "fraud", "scam", "breach", "hacked", "password",
        ],
    ),
    (
        NewsCategory::International,
        &[
            "summit", "global", "world", "international", "nations", "treaty", "foreign",
            "countries", "diplomatic", "climate",
        ],
    ),
];

pub struct SummarizationEngine {
    /// A run of terminators, optional closing quotes or brackets, then whitespace or the end.
    boundary_pattern: Regex,
}

impl Default for SummarizationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SummarizationEngine {
    pub fn new() -> Self {
        Self {
            boundary_pattern: Regex::new(r#"[.!?।]+["'”’)\]]*(?:\s+|$)"#)
                .expect("boundary pattern is valid"),
        }
    }

    pub fn summarize(
        &self,
        payload: &ContentPayload,
        language_code: &str,
    ) -> GuardianResult<SummaryResult> {
        let language = Language::from_code(language_code)
            .ok_or_else(|| GuardianError::UnsupportedLanguage(language_code.trim().to_string()))?;

        let sentences = self.split_sentences(&payload.raw_text);
        if sentences.is_empty() {
            return Err(GuardianError::Summarization(
                "no sentences could be extracted from the content".to_string(),
            ));
        }

        let bullet_sentences = select_bullets(&sentences);
        let word_count: usize = bullet_sentences
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum();
        let reading_time_minutes = word_count.div_ceil(WORDS_PER_MINUTE).max(1);

        let tokens = terms(&payload.raw_text);

        Ok(SummaryResult {
            title: title_from(&sentences[0]),
            key_points: key_points(&bullet_sentences),
            sentiment: sentiment_of(&tokens),
            category: categorize(&tokens),
            language,
            bullet_sentences,
            word_count,
            reading_time_minutes,
        })
    }

    fn split_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in self.boundary_pattern.find_iter(text) {
            if ends_sentence(&text[start..boundary.start()], &text[boundary.end()..]) {
                sentences.push(&text[start..boundary.end()]);
                start = boundary.end();
            }
        }
        sentences.push(&text[start..]);

        sentences
            .into_iter()
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| s.chars().any(char::is_alphanumeric))
            .collect()
    }
}

/// Decides whether a terminator between `before` and `after` closes a sentence.
///
/// A lowercase continuation ("the U.S. last quarter") or a known abbreviation
/// ("Dr. Rao") keeps the sentence open.
fn ends_sentence(before: &str, after: &str) -> bool {
    if after
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase() || c.is_ascii_digit())
    {
        return false;
    }
    let last_word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    !ABBREVIATIONS.contains(&last_word.as_str())
}

/// Lowercased words of three or more characters.
fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn content_terms(text: &str) -> Vec<String> {
    terms(text)
        .into_iter()
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Picks the highest-scoring sentences and returns them in source order.
fn select_bullets(sentences: &[String]) -> Vec<String> {
    let per_sentence: Vec<Vec<String>> = sentences.iter().map(|s| content_terms(s)).collect();

    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for term in per_sentence.iter().flatten() {
        *frequencies.entry(term.as_str()).or_default() += 1;
    }
    let max_frequency = frequencies.values().copied().max().unwrap_or(1) as f64;

    let scores: Vec<f64> = per_sentence
        .iter()
        .map(|sentence_terms| {
            if sentence_terms.is_empty() {
                return 0.0;
            }
            let total: f64 = sentence_terms
                .iter()
                .map(|t| frequencies.get(t.as_str()).copied().unwrap_or(0) as f64 / max_frequency)
                .sum();
            total / sentence_terms.len() as f64
        })
        .collect();

    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    ranked.truncate(MAX_BULLETS);
    ranked.sort_unstable();

    ranked.into_iter().map(|i| sentences[i].clone()).collect()
}

fn title_from(sentence: &str) -> String {
    sentence
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| TERMINATORS.contains(&c) || matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}

fn key_points(bullets: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut points = Vec::new();
    for bullet in bullets {
        let clause = bullet
            .split([',', ';', ':'])
            .next()
            .unwrap_or_default()
            .trim_end_matches(TERMINATORS);
        let point = clause
            .split_whitespace()
            .take(KEY_POINT_WORDS)
            .collect::<Vec<_>>()
            .join(" ");
        if point.is_empty() || !seen.insert(point.to_lowercase()) {
            continue;
        }
        points.push(point);
        if points.len() == MAX_KEY_POINTS {
            break;
        }
    }
    points
}

fn sentiment_of(tokens: &[String]) -> Sentiment {
    let score: i64 = tokens
        .iter()
        .map(|t| {
            if POSITIVE_TERMS.contains(&t.as_str()) {
                1
            } else if NEGATIVE_TERMS.contains(&t.as_str()) {
                -1
            } else {
                0
            }
        })
        .sum();
    match score {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

fn categorize(tokens: &[String]) -> NewsCategory {
    let mut best = (NewsCategory::General, 0usize);
    for (category, keywords) in CATEGORY_TERMS {
        let hits = tokens
            .iter()
            .filter(|t| keywords.contains(&t.as_str()))
            .count();
        if hits > best.1 {
            best = (*category, hits);
        }
    }
    best.0
}
