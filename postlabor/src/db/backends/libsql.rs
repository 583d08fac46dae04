use crate::db::connection::Database;
use crate::db::repository::ResearchRepository;
use crate::db::traits::{DatabaseBackend, ResearchStore};
use crate::error::Result;
use crate::models::{NewResearchRecord, ResearchRecord, TopicHistoryEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResearchStore for LibSqlBackend {
    async fn create_research(&self, record: &NewResearchRecord) -> Result<ResearchRecord> {
        let conn = self.db.connect()?;
        ResearchRepository::create(&conn, record).await
    }
    async fn get_research_by_id(&self, id: i64) -> Result<Option<ResearchRecord>> {
        let conn = self.db.connect()?;
        ResearchRepository::get_by_id(&conn, id).await
    }
    async fn get_latest_research(&self, limit: u32, offset: u32) -> Result<Vec<ResearchRecord>> {
        let conn = self.db.connect()?;
        ResearchRepository::get_latest(&conn, limit, offset).await
    }
    async fn find_research_by_topic(
        &self,
        topic: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<ResearchRecord>> {
        let conn = self.db.connect()?;
        ResearchRepository::find_by_topic(&conn, topic, since).await
    }
    async fn get_research_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ResearchRecord>> {
        let conn = self.db.connect()?;
        ResearchRepository::get_since(&conn, cutoff).await
    }
    async fn topic_researched_since(&self, topic: &str, cutoff: DateTime<Utc>) -> Result<bool> {
        let conn = self.db.connect()?;
        ResearchRepository::topic_exists_since(&conn, topic, cutoff).await
    }
    async fn list_topics(&self) -> Result<Vec<TopicHistoryEntry>> {
        let conn = self.db.connect()?;
        ResearchRepository::list_topics(&conn).await
    }
    async fn cleanup_old_research(&self, keep_count: u32) -> Result<u64> {
        let conn = self.db.connect()?;
        let deleted = ResearchRepository::delete_oldest_beyond(&conn, keep_count).await?;
        if deleted > 0 {
            tracing::info!(deleted, keep_count, "Removed old research records");
        }
        Ok(deleted)
    }
    async fn delete_all_research(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ResearchRepository::delete_all(&conn).await
    }
    async fn count_research(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ResearchRepository::count(&conn).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}
