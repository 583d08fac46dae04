//! Research DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::RunSettings;
use crate::models::{
    BatchSummary, ResearchMode, ResearchOutcome, ResearchRecord, ResearchStatus, Source,
    TopicHistoryEntry,
};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /v1/research`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListResearchQuery {
    /// Maximum records per page (default 10, clamped to 1..=50).
    pub limit: Option<u32>,
    /// Number of newest records to skip.
    pub offset: Option<u32>,
}

/// Request body for `POST /v1/research:run`.
///
/// Without a `topic` the whole configured pool for the chosen mode is
/// researched.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunResearchRequest {
    pub topic: Option<String>,
    #[serde(flatten)]
    pub settings: RunSettings,
}

/// Request body for `POST /v1/research:fresh`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FreshResearchRequest {
    /// Number of topics to pick. Defaults to the configured selection
    /// count, or 3 when that is unset.
    pub count: Option<usize>,
    #[serde(flatten)]
    pub settings: RunSettings,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// A stored research record.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub id: i64,
    pub topic: String,
    pub summary: String,
    pub sources: Vec<Source>,
    pub key_stats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// Whether `GET /v1/research/{id}/image` will return bytes.
    pub has_embedded_image: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ResearchRecord> for ResearchResponse {
    fn from(record: ResearchRecord) -> Self {
        Self {
            has_embedded_image: record.image_data.as_ref().is_some_and(|d| !d.is_empty()),
            id: record.id,
            topic: record.topic,
            summary: record.summary,
            sources: record.sources,
            key_stats: record.key_stats,
            image_url: record.image_url,
            image_prompt: record.image_prompt,
            created_at: record.created_at,
        }
    }
}

/// Response for `GET /v1/research`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListResearchResponse {
    pub research: Vec<ResearchResponse>,
    pub count: usize,
}

/// Result of one topic run.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResponse {
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

impl From<ResearchOutcome> for OutcomeResponse {
    fn from(outcome: ResearchOutcome) -> Self {
        Self {
            topic: outcome.topic,
            status: outcome.status,
            record_id: outcome.record_id,
            summary_preview: outcome.summary_preview,
            image_url: outcome.image_url,
            message: outcome.message,
            cached: outcome.cached,
        }
    }
}

/// Response for the research triggers. A single-topic run is reported as a
/// batch of one.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub topics_researched: usize,
    pub cached_results: usize,
    pub new_results: usize,
    pub results: Vec<OutcomeResponse>,
}

impl From<BatchSummary> for BatchResponse {
    fn from(summary: BatchSummary) -> Self {
        Self {
            topics_researched: summary.topics_researched,
            cached_results: summary.cached_results,
            new_results: summary.new_results,
            results: summary.results.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response for `GET /v1/research/topics`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicsResponse {
    /// Mode the scheduler runs in.
    pub mode: ResearchMode,
    pub topics: Vec<String>,
    pub news_queries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicHistoryItem {
    pub topic: String,
    pub last_researched: DateTime<Utc>,
    pub count: u32,
}

impl From<TopicHistoryEntry> for TopicHistoryItem {
    fn from(entry: TopicHistoryEntry) -> Self {
        Self {
            topic: entry.topic,
            last_researched: entry.last_researched,
            count: entry.count,
        }
    }
}

/// Response for `GET /v1/research/history`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicHistoryResponse {
    pub history: Vec<TopicHistoryItem>,
    pub count: usize,
}
