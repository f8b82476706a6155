//! crates/news_guardian_core/src/intent.rs
//!
//! Maps a single chat message to canned guidance. Rules are consulted in the
//! order they were registered and the first match wins, so an ambiguous message
//! always resolves to the earliest rule.

pub const GREETING: &str = "Hello! I'm NewsGuardian AI. I can help you with fake news detection, \
news summarization, and answer questions about our platform. How can I assist you today?";

const DETECTION_REPLY: &str = "I can help you detect fake news! You can upload articles, links, \
or files through our detection system. The AI analyzes content for credibility, source \
verification, and factual accuracy. Would you like to try it now?";

const SUMMARIZATION_REPLY: &str = "Our summarization feature can condense news articles into key \
points. You can upload files or paste links, and I'll extract the main information in your \
preferred language. Which language would you like the summary in?";

const NEWS_REPLY: &str = "We provide news updates across 6 categories: Education, Politics, \
Medical, Farming, Cyber Crime, and International news. Would you like to see the latest updates?";

const HELP_REPLY: &str = "I'm here to help! You can:\n\
• Detect fake news using our AI model\n\
• Summarize articles in multiple languages\n\
• Browse verified news by category\n\
• Manage your profile and settings\n\
What would you like to know more about?";

/// A keyword-to-response mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub name: String,
    /// Lowercased keywords; any one of them appearing in the message matches.
    pub keywords: Vec<String>,
    pub response: String,
}

impl IntentRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct IntentResponder {
    rules: Vec<IntentRule>,
}

impl Default for IntentResponder {
    /// The platform's standard rule set.
    fn default() -> Self {
        Self::builder()
            .rule("detection", &["fake news", "detect"], DETECTION_REPLY)
            .rule("summarization", &["summarize", "summary"], SUMMARIZATION_REPLY)
            .rule("news", &["news", "latest"], NEWS_REPLY)
            .rule("help", &["how to", "help"], HELP_REPLY)
            .build()
    }
}

impl IntentResponder {
    pub fn builder() -> IntentResponderBuilder {
        IntentResponderBuilder { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// The first rule whose keywords appear in the message, ignoring case.
    pub fn classify(&self, user_text: &str) -> Option<&IntentRule> {
        let lowered = user_text.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }

    /// Depends only on `user_text`; no conversation history is consulted.
    pub fn respond(&self, user_text: &str) -> String {
        match self.classify(user_text) {
            Some(rule) => rule.response.clone(),
            None => fallback(user_text),
        }
    }

    pub fn greeting(&self) -> &'static str {
        GREETING
    }
}

fn fallback(user_text: &str) -> String {
    format!(
        "I understand you're asking about \"{}\". As NewsGuardian AI, I specialize in helping \
         with fake news detection, news summarization, and platform features. Could you please \
         provide more details about what you'd like to know?",
        user_text
    )
}

pub struct IntentResponderBuilder {
    rules: Vec<IntentRule>,
}

impl IntentResponderBuilder {
    /// Appends a rule. Rules registered earlier take precedence.
    pub fn rule(mut self, name: &str, keywords: &[&str], response: &str) -> Self {
        self.rules.push(IntentRule {
            name: name.to_string(),
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            response: response.to_string(),
        });
        self
    }

    pub fn build(self) -> IntentResponder {
        IntentResponder { rules: self.rules }
    }
}
