use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{Config, ResearchConfig};
use crate::db::ResearchStore;
use crate::illustration::{IllustrationResult, Illustrator, ImageGenerator};
use crate::llm::TextGenerator;
use crate::models::{
    BatchSummary, NewResearchRecord, ResearchMode, ResearchOutcome, RunOptions, SearchResult,
};
use crate::research::analysis::Summarizer;
use crate::research::freshness::{window_cutoff, FreshnessOracle};
use crate::research::selector::TopicSelector;
use crate::research::similarity::similarity_for;
use crate::search::WebSearcher;

/// External services the orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ResearchStore>,
    pub searcher: Arc<dyn WebSearcher>,
    pub text: Arc<dyn TextGenerator>,
    /// `None` disables illustration entirely.
    pub images: Option<Arc<dyn ImageGenerator>>,
}

/// Runs the search, summarize, illustrate and persist pipeline for single
/// topics and for batches.
///
/// Runs are serialized: a second caller waits until the current topic or
/// batch has finished.
pub struct ResearchOrchestrator {
    store: Arc<dyn ResearchStore>,
    searcher: Arc<dyn WebSearcher>,
    summarizer: Summarizer,
    illustrator: Option<Illustrator>,
    freshness: FreshnessOracle,
    selector: TopicSelector,
    config: ResearchConfig,
    search_max_results: u32,
    run_lock: Mutex<()>,
    runs: AtomicU64,
}

impl ResearchOrchestrator {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let research = config.research.clone();
        let Collaborators {
            store,
            searcher,
            text,
            images,
        } = collaborators;

        let illustrator = images.filter(|_| config.image.enabled).map(|images| {
            Illustrator::new(
                Arc::clone(&text),
                images,
                research.image_prompt_max_tokens,
                config.image.prompt_max_chars,
            )
        });

        Self {
            summarizer: Summarizer::new(
                Arc::clone(&text),
                research.content_truncate_chars,
                research.analysis_max_tokens,
            ),
            illustrator,
            freshness: FreshnessOracle::new(
                Arc::clone(&store),
                similarity_for(research.similarity),
                research.min_new_urls,
            ),
            selector: TopicSelector::new(research.overlap_threshold, research.selection_seed),
            store,
            searcher,
            search_max_results: config.search.max_results,
            config: research,
            run_lock: Mutex::new(()),
            runs: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Topic runs started since the process came up, cached ones included.
    pub fn runs_started(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Options the scheduler uses.
    pub fn scheduled_options(&self) -> RunOptions {
        RunOptions {
            force: false,
            generate_images: self.config.generate_images,
            mode: self.config.mode,
        }
    }

    pub async fn run_topic(&self, topic: &str, options: RunOptions) -> ResearchOutcome {
        let _guard = self.run_lock.lock().await;
        self.research_topic(topic, options).await
    }

    /// Research every topic of the configured pool, one after another.
    pub async fn run_all(&self, options: RunOptions) -> BatchSummary {
        let _guard = self.run_lock.lock().await;
        let topics = self.config.pool(options.mode).to_vec();
        self.run_batch(&topics, options).await
    }

    /// Research `count` topics picked by the fresh-topic selector.
    pub async fn run_fresh(&self, count: usize, options: RunOptions) -> BatchSummary {
        let _guard = self.run_lock.lock().await;
        let topics = self.select_fresh_topics(count, options.mode).await;
        self.run_batch(&topics, options).await
    }

    /// Periodic entry point: one batch without forcing, then retention
    /// cleanup.
    pub async fn run_scheduled(&self) -> BatchSummary {
        let options = self.scheduled_options();
        let summary = match self.config.selection_count {
            0 => self.run_all(options).await,
            count => self.run_fresh(count, options).await,
        };

        match self
            .store
            .cleanup_old_research(self.config.retention_keep_count)
            .await
        {
            Ok(removed) => tracing::debug!(removed, "Retention cleanup after scheduled run"),
            Err(e) => tracing::error!(error = %e, "Retention cleanup failed"),
        }

        summary
    }

    async fn run_batch(&self, topics: &[String], options: RunOptions) -> BatchSummary {
        let mut outcomes = Vec::with_capacity(topics.len());
        for topic in topics {
            let outcome = self.research_topic(topic, options).await;
            tracing::info!(topic = %topic, status = %outcome.status, "Completed topic");
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(outcomes);
        tracing::info!(
            topics = summary.topics_researched,
            new = summary.new_results,
            cached = summary.cached_results,
            "Research batch finished"
        );
        summary
    }

    async fn select_fresh_topics(&self, count: usize, mode: ResearchMode) -> Vec<String> {
        let history: Vec<String> = match self.store.list_topics().await {
            Ok(entries) => entries.into_iter().map(|e| e.topic).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load topic history, selecting without it");
                Vec::new()
            }
        };

        let cutoff = window_cutoff(self.config.freshness_window_hours);
        let recent = match self.store.get_research_since(cutoff).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load recent research for selection");
                Vec::new()
            }
        };

        let is_stale = |topic: &str| self.freshness.matches_any(topic, &recent);
        self.selector
            .select_topics(count, self.config.pool(mode), &history, &is_stale)
    }

    async fn research_topic(&self, topic: &str, options: RunOptions) -> ResearchOutcome {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        let topic = topic.trim();
        tracing::info!(run, topic, mode = %options.mode, force = options.force, "Researching");

        if topic.is_empty() {
            return ResearchOutcome::error(topic, "Topic cannot be empty");
        }

        if !options.force {
            match self
                .freshness
                .find_recent_match(topic, self.config.cache_hours)
                .await
            {
                Ok(Some(existing)) => {
                    tracing::info!(run, topic, record_id = existing.id, "Using cached research");
                    return ResearchOutcome::cached(topic, &existing);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(run, topic, error = %e, "Cache lookup failed, researching anyway");
                }
            }
        }

        let results = self.search(topic).await;
        if results.is_empty() {
            return ResearchOutcome::no_results(topic);
        }

        if options.mode == ResearchMode::News && !self.has_fresh_content(&results).await {
            tracing::info!(run, topic, "Search results contain no new sources");
            return ResearchOutcome::not_fresh(topic);
        }

        let analysis = self.summarizer.summarize(topic, &results, options.mode).await;

        if options.mode == ResearchMode::News
            && analysis.summary.trim().is_empty()
            && !analysis.breaking
        {
            return ResearchOutcome::not_significant(topic);
        }

        let illustration = match (&self.illustrator, options.generate_images) {
            (Some(illustrator), true) => {
                Some(illustrator.illustrate(topic, &analysis.summary).await)
            }
            _ => None,
        };
        let IllustrationResult {
            image_url,
            image_data,
            prompt,
        } = illustration.unwrap_or_default();

        let record = NewResearchRecord {
            topic: topic.to_string(),
            summary: analysis.summary,
            sources: analysis.sources,
            key_stats: analysis.key_stats,
            image_url,
            image_data,
            image_prompt: Some(prompt).filter(|p| !p.is_empty()),
        };

        match self.store.create_research(&record).await {
            Ok(saved) => {
                tracing::info!(run, topic, record_id = saved.id, "Saved research");
                ResearchOutcome::success(topic, saved.id, &saved.summary, saved.image_url)
            }
            Err(e) => {
                tracing::error!(run, topic, error = %e, "Failed to save research");
                ResearchOutcome::error(topic, e.to_string())
            }
        }
    }

    async fn search(&self, topic: &str) -> Vec<SearchResult> {
        match self.searcher.search(topic, self.search_max_results).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(topic, error = %e, "Web search failed");
                Vec::new()
            }
        }
    }

    async fn has_fresh_content(&self, results: &[SearchResult]) -> bool {
        let recent = match self
            .store
            .get_latest_research(self.config.freshness_history, 0)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load recent sources, treating results as fresh");
                Vec::new()
            }
        };

        self.freshness.is_content_fresh(results, &recent)
    }
}
