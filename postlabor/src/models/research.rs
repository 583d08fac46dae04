use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single ranked hit from the web search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            published_date: None,
        }
    }
}

/// Citation stored alongside a research record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub date: String,
}

impl Source {
    /// Build a citation from a search hit. The published date is used when
    /// the search provider reports one, otherwise the current year.
    pub fn from_result(result: &SearchResult, now: DateTime<Utc>) -> Self {
        let date = result
            .published_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| now.format("%Y").to_string());

        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            date,
        }
    }
}

/// Structured output of the summarization step. Built once per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Analysis {
    pub summary: String,
    pub key_stats: Vec<String>,
    /// Main insight or trend (standard mode).
    pub insight: String,
    /// Significance flag (news mode).
    pub breaking: bool,
    pub sources: Vec<Source>,
}

/// A persisted research outcome. Records are never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchRecord {
    pub id: i64,
    pub topic: String,
    pub summary: String,
    pub sources: Vec<Source>,
    pub key_stats: Vec<String>,
    pub image_url: Option<String>,
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
    pub image_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResearchRecord {
    pub fn has_image(&self) -> bool {
        self.image_url.is_some() || self.image_data.is_some()
    }
}

/// Insert payload for the research store. The store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewResearchRecord {
    pub topic: String,
    pub summary: String,
    pub sources: Vec<Source>,
    pub key_stats: Vec<String>,
    pub image_url: Option<String>,
    pub image_data: Option<Vec<u8>>,
    pub image_prompt: Option<String>,
}

/// One distinct researched topic with the time it was last covered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicHistoryEntry {
    pub topic: String,
    pub last_researched: DateTime<Utc>,
    pub count: u32,
}

/// Lowercase, trim and collapse internal whitespace so topic comparisons are
/// insensitive to formatting.
pub fn normalize_topic(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_topic_collapses_whitespace_and_case() {
        assert_eq!(normalize_topic("  AI   Layoffs\tToday "), "ai layoffs today");
        assert_eq!(normalize_topic(""), "");
    }

    #[test]
    fn source_date_prefers_published_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let mut result = SearchResult::new("t", "https://a.example", "c");
        assert_eq!(Source::from_result(&result, now).date, "2025");

        result.published_date = Some("2025-02-27".to_string());
        assert_eq!(Source::from_result(&result, now).date, "2025-02-27");

        result.published_date = Some("   ".to_string());
        assert_eq!(Source::from_result(&result, now).date, "2025");
    }
}
