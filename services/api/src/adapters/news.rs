//! services/api/src/adapters/news.rs
//!
//! A fixed, in-process headline feed. It stands in for a real news source until
//! one is wired up behind `NewsCatalogue`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use news_guardian_core::domain::{NewsCategory, NewsItem};
use news_guardian_core::ports::{NewsCatalogue, PortResult};

/// (id, title, description, category, source, published at)
const SEED: &[(&str, &str, &str, NewsCategory, &str, &str)] = &[
    (
        "1",
        "New Education Policy Implementation Begins",
        "The government has started implementing the new education policy across all states with focus on digital learning...",
        NewsCategory::Education,
        "Education Times",
        "2024-01-15T10:30:00Z",
    ),
    (
        "2",
        "Election Commission Announces Poll Dates",
        "The Election Commission has announced the schedule for upcoming assembly elections in five states...",
        NewsCategory::Politics,
        "Political Daily",
        "2024-01-15T09:15:00Z",
    ),
    (
        "3",
        "Breakthrough in Cancer Research",
        "Scientists have discovered a new treatment method that shows promising results in cancer therapy...",
        NewsCategory::Medical,
        "Medical Journal",
        "2024-01-15T08:45:00Z",
    ),
    (
        "4",
        "New Farming Techniques Boost Crop Yield",
        "Farmers are adopting new sustainable farming techniques that have shown 40% increase in crop production...",
        NewsCategory::Farming,
        "Agriculture Today",
        "2024-01-15T07:30:00Z",
    ),
    (
        "5",
        "Major Cyber Attack on Banking Systems",
        "Security experts have detected a sophisticated cyber attack targeting multiple banking institutions...",
        NewsCategory::CyberCrime,
        "Cyber Security News",
        "2024-01-15T06:20:00Z",
    ),
    (
        "6",
        "Global Climate Summit Reaches Historic Agreement",
        "World leaders have reached a landmark agreement on climate action at the Global Climate Summit...",
        NewsCategory::International,
        "World News",
        "2024-01-15T05:45:00Z",
    ),
];

#[derive(Debug, Clone)]
pub struct StaticCatalogue {
    items: Vec<NewsItem>,
}

impl StaticCatalogue {
    /// Builds a catalogue over `items`, kept newest first.
    pub fn new(mut items: Vec<NewsItem>) -> Self {
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id)));
        Self { items }
    }

    /// The built-in headlines, one per category.
    pub fn seeded() -> Self {
        let items = SEED
            .iter()
            .filter_map(|&(id, title, description, category, source, published_at)| {
                let published_at = DateTime::parse_from_rfc3339(published_at).ok()?;
                Some(NewsItem {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    category,
                    source: source.to_string(),
                    published_at: published_at.with_timezone(&Utc),
                    url: "#".to_string(),
                })
            })
            .collect();
        Self::new(items)
    }
}

impl Default for StaticCatalogue {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl NewsCatalogue for StaticCatalogue {
    async fn list_news(&self, category: Option<NewsCategory>) -> PortResult<Vec<NewsItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| category.map_or(true, |c| item.category == c))
            .cloned()
            .collect())
    }
}
