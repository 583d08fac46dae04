use serde::{Deserialize, Serialize};

use super::{ResearchMode, ResearchRecord, ResearchStatus};

/// Maximum number of summary characters echoed back in an outcome.
pub const SUMMARY_PREVIEW_CHARS: usize = 200;

/// Per-run switches for the orchestrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOptions {
    /// Bypass the cache window and research anyway.
    pub force: bool,
    pub generate_images: bool,
    pub mode: ResearchMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            force: false,
            generate_images: true,
            mode: ResearchMode::Standard,
        }
    }
}

/// What happened to one topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchOutcome {
    pub topic: String,
    pub status: ResearchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cached: bool,
}

impl ResearchOutcome {
    fn bare(topic: &str, status: ResearchStatus, message: Option<&str>) -> Self {
        Self {
            topic: topic.to_string(),
            status,
            record_id: None,
            summary_preview: None,
            image_url: None,
            message: message.map(str::to_string),
            cached: false,
        }
    }

    pub fn cached(topic: &str, record: &ResearchRecord) -> Self {
        Self {
            topic: topic.to_string(),
            status: ResearchStatus::Cached,
            record_id: Some(record.id),
            summary_preview: Some(summary_preview(&record.summary)),
            image_url: record.image_url.clone(),
            message: None,
            cached: true,
        }
    }

    pub fn success(topic: &str, record_id: i64, summary: &str, image_url: Option<String>) -> Self {
        Self {
            topic: topic.to_string(),
            status: ResearchStatus::Success,
            record_id: Some(record_id),
            summary_preview: Some(summary_preview(summary)),
            image_url,
            message: None,
            cached: false,
        }
    }

    pub fn no_results(topic: &str) -> Self {
        Self::bare(topic, ResearchStatus::NoResults, Some("No search results found"))
    }

    pub fn not_fresh(topic: &str) -> Self {
        Self::bare(
            topic,
            ResearchStatus::NotFresh,
            Some("Search results contain no new sources"),
        )
    }

    pub fn not_significant(topic: &str) -> Self {
        Self::bare(
            topic,
            ResearchStatus::NotSignificant,
            Some("Nothing significant to report"),
        )
    }

    pub fn error(topic: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::bare(topic, ResearchStatus::Error, Some(&message))
    }
}

/// Aggregate of a sequential batch run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub topics_researched: usize,
    pub cached_results: usize,
    pub new_results: usize,
    pub results: Vec<ResearchOutcome>,
}

impl BatchSummary {
    pub fn from_outcomes(results: Vec<ResearchOutcome>) -> Self {
        let cached_results = results.iter().filter(|r| r.cached).count();
        let new_results = results
            .iter()
            .filter(|r| r.status.persisted())
            .count();

        Self {
            topics_researched: results.len(),
            cached_results,
            new_results,
            results,
        }
    }
}

/// First [`SUMMARY_PREVIEW_CHARS`] characters of a summary, with `...`
/// appended when anything was cut.
pub fn summary_preview(summary: &str) -> String {
    let mut chars = summary.char_indices();
    match chars.nth(SUMMARY_PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &summary[..byte_idx]),
        None => summary.to_string(),
    }
}
