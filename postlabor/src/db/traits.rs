use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{NewResearchRecord, ResearchRecord, TopicHistoryEntry};

/// Persistence for research records.
///
/// Every operation is a single statement, so callers never observe a
/// half-written record.
#[async_trait]
pub trait ResearchStore: Send + Sync {
    /// Insert a record. The store assigns `id` and `created_at` and returns
    /// the stored record.
    async fn create_research(&self, record: &NewResearchRecord) -> Result<ResearchRecord>;

    async fn get_research_by_id(&self, id: i64) -> Result<Option<ResearchRecord>>;

    /// Newest first.
    async fn get_latest_research(&self, limit: u32, offset: u32) -> Result<Vec<ResearchRecord>>;

    /// Newest record whose topic contains, or is contained in, `topic`
    /// (case-insensitive), optionally restricted to records created after
    /// `since`.
    async fn find_research_by_topic(
        &self,
        topic: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<ResearchRecord>>;

    /// All records created after `cutoff`, newest first.
    async fn get_research_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ResearchRecord>>;

    async fn topic_researched_since(&self, topic: &str, cutoff: DateTime<Utc>) -> Result<bool>;

    /// Distinct topics with the time each was last researched, most recent
    /// first.
    async fn list_topics(&self) -> Result<Vec<TopicHistoryEntry>>;

    /// Keep the newest `keep_count` records and delete the rest. Returns the
    /// number of deleted rows.
    async fn cleanup_old_research(&self, keep_count: u32) -> Result<u64>;

    async fn delete_all_research(&self) -> Result<u64>;

    async fn count_research(&self) -> Result<u64>;
}

#[async_trait]
pub trait DatabaseBackend: ResearchStore {
    /// Push local writes to the remote primary when running as an embedded
    /// replica. No-op for plain local databases.
    async fn sync(&self) -> Result<()>;
}
