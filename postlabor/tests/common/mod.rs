#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use postlabor::config::{
    Config, DatabaseConfig, ImageConfig, ResearchConfig, SearchConfig, ServerConfig,
};
use postlabor::db::{Database, LibSqlBackend, ResearchStore};
use postlabor::error::{PostlaborError, Result};
use postlabor::illustration::{GeneratedImage, ImageGenerator};
use postlabor::llm::prompts::IMAGE_PROMPT_SYSTEM;
use postlabor::llm::TextGenerator;
use postlabor::models::{NewResearchRecord, ResearchRecord, SearchResult, Source, TopicHistoryEntry};
use postlabor::research::{Collaborators, ResearchOrchestrator};
use postlabor::search::WebSearcher;

pub const ANALYSIS_JSON: &str = r#"```json
{"summary": "Tech layoffs attributed to AI reached a new high this quarter.", "key_stats": ["40,000 roles cut", "12% of layoffs cite AI", "3 sectors most affected"], "insight": "Displacement is concentrating in white-collar support work."}
```"#;

/// Opens a fresh file-backed database in a temp directory.
pub async fn temp_store() -> (Arc<LibSqlBackend>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = DatabaseConfig {
        url: format!("file:{}", dir.path().join("research.db").display()),
        auth_token: None,
        local_path: None,
    };
    let db = Database::new(&config).await.expect("open database");
    (Arc::new(LibSqlBackend::new(db)), dir)
}

pub fn test_config(topics: &[&str]) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_keys: vec![],
        },
        database: DatabaseConfig {
            url: "file::memory:".to_string(),
            auth_token: None,
            local_path: None,
        },
        llm: None,
        search: SearchConfig::default(),
        image: ImageConfig::default(),
        research: ResearchConfig {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            news_queries: vec!["AI layoffs today".to_string()],
            selection_seed: Some(11),
            ..ResearchConfig::default()
        },
    }
}

pub fn results(urls: &[&str]) -> Vec<SearchResult> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| SearchResult::new(format!("Story {i}"), *url, format!("Body of story {i}")))
        .collect()
}

pub fn record(topic: &str, urls: &[&str]) -> NewResearchRecord {
    NewResearchRecord {
        topic: topic.to_string(),
        summary: format!("Earlier findings on {topic}"),
        sources: urls
            .iter()
            .map(|u| Source {
                title: "t".to_string(),
                url: u.to_string(),
                date: "2025".to_string(),
            })
            .collect(),
        key_stats: vec!["1".to_string()],
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

pub struct ScriptedSearch {
    results: Option<Vec<SearchResult>>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            results: Some(results),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: None,
            ..Self::returning(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearcher for ScriptedSearch {
    async fn search(&self, query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.results
            .clone()
            .ok_or_else(|| PostlaborError::Search("connection reset".to_string()))
    }
}

/// Answers analysis requests and image-prompt requests separately.
pub struct ScriptedText {
    analysis: Option<String>,
    image_prompt: Option<String>,
    pub analysis_calls: AtomicUsize,
    pub image_prompt_calls: AtomicUsize,
    pub image_prompt_requests: Mutex<Vec<String>>,
}

impl ScriptedText {
    pub fn new(analysis: Option<&str>, image_prompt: Option<&str>) -> Self {
        Self {
            analysis: analysis.map(str::to_string),
            image_prompt: image_prompt.map(str::to_string),
            analysis_calls: AtomicUsize::new(0),
            image_prompt_calls: AtomicUsize::new(0),
            image_prompt_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn analysis_calls(&self) -> usize {
        self.analysis_calls.load(Ordering::SeqCst)
    }

    pub fn image_prompt_calls(&self) -> usize {
        self.image_prompt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(&self, system: &str, prompt: &str, _max_tokens: u32) -> Result<String> {
        let reply = if system == IMAGE_PROMPT_SYSTEM {
            self.image_prompt_calls.fetch_add(1, Ordering::SeqCst);
            self.image_prompt_requests.lock().unwrap().push(prompt.to_string());
            &self.image_prompt
        } else {
            self.analysis_calls.fetch_add(1, Ordering::SeqCst);
            &self.analysis
        };

        reply
            .clone()
            .ok_or_else(|| PostlaborError::Llm("request timed out".to_string()))
    }
}

pub struct ScriptedImages {
    image: Option<GeneratedImage>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedImages {
    pub fn returning(image: GeneratedImage) -> Self {
        Self {
            image: Some(image),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            image: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for ScriptedImages {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.image
            .clone()
            .ok_or_else(|| PostlaborError::Image("HTTP 500: content policy".to_string()))
    }
}

/// Delegates to a real store but refuses every insert.
pub struct ReadOnlyStore(pub Arc<LibSqlBackend>);

#[async_trait]
impl ResearchStore for ReadOnlyStore {
    async fn create_research(&self, _record: &NewResearchRecord) -> Result<ResearchRecord> {
        Err(PostlaborError::Internal("attempt to write a readonly database".to_string()))
    }

    async fn get_research_by_id(&self, id: i64) -> Result<Option<ResearchRecord>> {
        self.0.get_research_by_id(id).await
    }

    async fn get_latest_research(&self, limit: u32, offset: u32) -> Result<Vec<ResearchRecord>> {
        self.0.get_latest_research(limit, offset).await
    }

    async fn find_research_by_topic(
        &self,
        topic: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<ResearchRecord>> {
        self.0.find_research_by_topic(topic, since).await
    }

    async fn get_research_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<ResearchRecord>> {
        self.0.get_research_since(cutoff).await
    }

    async fn topic_researched_since(&self, topic: &str, cutoff: DateTime<Utc>) -> Result<bool> {
        self.0.topic_researched_since(topic, cutoff).await
    }

    async fn list_topics(&self) -> Result<Vec<TopicHistoryEntry>> {
        self.0.list_topics().await
    }

    async fn cleanup_old_research(&self, keep_count: u32) -> Result<u64> {
        self.0.cleanup_old_research(keep_count).await
    }

    async fn delete_all_research(&self) -> Result<u64> {
        self.0.delete_all_research().await
    }

    async fn count_research(&self) -> Result<u64> {
        self.0.count_research().await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub orchestrator: Arc<ResearchOrchestrator>,
    pub store: Arc<LibSqlBackend>,
    pub search: Arc<ScriptedSearch>,
    pub text: Arc<ScriptedText>,
    pub images: Arc<ScriptedImages>,
    _dir: TempDir,
}

pub struct HarnessBuilder {
    config: Config,
    search: ScriptedSearch,
    text: ScriptedText,
    images: ScriptedImages,
    read_only: bool,
}

impl HarnessBuilder {
    pub fn new(topics: &[&str]) -> Self {
        Self {
            config: test_config(topics),
            search: ScriptedSearch::returning(results(&[
                "https://news.example/a",
                "https://news.example/b",
                "https://news.example/c",
            ])),
            text: ScriptedText::new(Some(ANALYSIS_JSON), Some("\"A quiet factory at dawn\"")),
            images: ScriptedImages::returning(GeneratedImage {
                url: Some("https://images.example/1.png".to_string()),
                revised_prompt: None,
                data: None,
            }),
            read_only: false,
        }
    }

    pub fn config(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn search(mut self, search: ScriptedSearch) -> Self {
        self.search = search;
        self
    }

    pub fn text(mut self, text: ScriptedText) -> Self {
        self.text = text;
        self
    }

    pub fn images(mut self, images: ScriptedImages) -> Self {
        self.images = images;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub async fn build(self) -> Harness {
        let (store, dir) = temp_store().await;
        let search = Arc::new(self.search);
        let text = Arc::new(self.text);
        let images = Arc::new(self.images);

        let orchestrator_store: Arc<dyn ResearchStore> = if self.read_only {
            Arc::new(ReadOnlyStore(store.clone()))
        } else {
            store.clone()
        };

        let orchestrator = ResearchOrchestrator::new(
            &self.config,
            Collaborators {
                store: orchestrator_store,
                searcher: search.clone(),
                text: text.clone(),
                images: Some(images.clone()),
            },
        );

        Harness {
            orchestrator: Arc::new(orchestrator),
            store,
            search,
            text,
            images,
            _dir: dir,
        }
    }
}
