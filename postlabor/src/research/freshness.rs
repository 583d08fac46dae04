use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use url::Url;

use crate::db::ResearchStore;
use crate::error::Result;
use crate::models::{ResearchRecord, SearchResult};
use crate::research::similarity::TopicSimilarity;

/// Decides whether a topic was covered recently and whether new search
/// results bring enough unseen sources to be worth summarizing.
#[derive(Clone)]
pub struct FreshnessOracle {
    store: Arc<dyn ResearchStore>,
    similarity: Arc<dyn TopicSimilarity>,
    min_new_urls: usize,
}

impl FreshnessOracle {
    pub fn new(
        store: Arc<dyn ResearchStore>,
        similarity: Arc<dyn TopicSimilarity>,
        min_new_urls: usize,
    ) -> Self {
        Self {
            store,
            similarity,
            min_new_urls,
        }
    }

    pub async fn is_topic_stale(&self, topic: &str, window_hours: i64) -> Result<bool> {
        Ok(self.find_recent_match(topic, window_hours).await?.is_some())
    }

    /// Newest record within the window whose topic is similar to `topic`.
    pub async fn find_recent_match(
        &self,
        topic: &str,
        window_hours: i64,
    ) -> Result<Option<ResearchRecord>> {
        let recent = self
            .store
            .get_research_since(window_cutoff(window_hours))
            .await?;

        Ok(recent
            .into_iter()
            .find(|record| self.similarity.similar(&record.topic, topic)))
    }

    /// Like [`Self::is_topic_stale`] against records already loaded.
    pub fn matches_any(&self, topic: &str, records: &[ResearchRecord]) -> bool {
        records
            .iter()
            .any(|record| self.similarity.similar(&record.topic, topic))
    }

    pub fn is_content_fresh(&self, new_results: &[SearchResult], recent: &[ResearchRecord]) -> bool {
        let new_urls: HashSet<String> = new_results
            .iter()
            .map(|r| normalize_url(&r.url))
            .filter(|u| !u.is_empty())
            .collect();

        if new_urls.is_empty() {
            return false;
        }

        let seen: HashSet<String> = recent
            .iter()
            .flat_map(|record| record.sources.iter())
            .map(|source| normalize_url(&source.url))
            .filter(|u| !u.is_empty())
            .collect();

        if seen.is_empty() {
            return true;
        }

        let unseen = new_urls.difference(&seen).count();
        tracing::debug!(
            unseen,
            total = new_urls.len(),
            required = self.min_new_urls,
            "Content freshness check"
        );

        unseen >= self.min_new_urls
    }
}

/// Start of a window reaching `hours` back from now. Windows too large to
/// represent reach back to the earliest representable time.
pub fn window_cutoff(hours: i64) -> DateTime<Utc> {
    TimeDelta::try_hours(hours)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Canonical form for URL comparison: no fragment, no trailing slash,
/// lowercase scheme and host. Unparseable input is compared as trimmed text.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}
