use std::sync::Arc;

use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::BatchSummary;
use crate::research::ResearchOrchestrator;
use tracing::info;

/// Periodic research job: one scheduled batch followed by retention
/// cleanup, then a replica sync.
#[derive(Clone)]
pub struct ResearchScheduler {
    orchestrator: Arc<ResearchOrchestrator>,
    db: Arc<dyn DatabaseBackend>,
    interval_secs: u64,
}

impl ResearchScheduler {
    pub fn new(
        orchestrator: Arc<ResearchOrchestrator>,
        db: Arc<dyn DatabaseBackend>,
        interval_secs: u64,
    ) -> Self {
        Self {
            orchestrator,
            db,
            interval_secs,
        }
    }

    pub async fn run_once(&self) -> Result<BatchSummary> {
        info!("Running scheduled research");

        let summary = self.orchestrator.run_scheduled().await;
        self.db.sync().await?;

        info!(
            topics = summary.topics_researched,
            new = summary.new_results,
            cached = summary.cached_results,
            "Scheduled research completed"
        );

        Ok(summary)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}
