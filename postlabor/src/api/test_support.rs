use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::api::AppState;
use crate::config::{
    Config, DatabaseConfig, ImageConfig, ResearchConfig, SearchConfig, ServerConfig,
};
use crate::db::{Database, LibSqlBackend};
use crate::error::Result;
use crate::llm::{LlmProvider, TextGenerator};
use crate::models::SearchResult;
use crate::research::{Collaborators, ResearchOrchestrator};
use crate::search::WebSearcher;

pub(crate) struct StubSearch {
    pub calls: AtomicUsize,
}

#[async_trait]
impl WebSearcher for StubSearch {
    async fn search(&self, query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            SearchResult::new(format!("{query} one"), "https://one.example/a", "first"),
            SearchResult::new(format!("{query} two"), "https://two.example/b", "second"),
        ])
    }
}

pub(crate) struct StubText;

#[async_trait]
impl TextGenerator for StubText {
    async fn generate(&self, _system: &str, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Ok(r#"{"summary": "Automation keeps spreading.", "key_stats": ["1", "2", "3"], "insight": "Faster"}"#.to_string())
    }
}

pub(crate) fn test_config(api_keys: Vec<String>, db_path: &std::path::Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_keys,
        },
        database: DatabaseConfig {
            url: format!("file:{}", db_path.display()),
            auth_token: None,
            local_path: None,
        },
        llm: None,
        search: SearchConfig::default(),
        image: ImageConfig {
            enabled: false,
            ..ImageConfig::default()
        },
        research: ResearchConfig {
            topics: vec!["robot tax".to_string(), "UBI pilots".to_string()],
            selection_seed: Some(7),
            ..ResearchConfig::default()
        },
    }
}

pub(crate) struct TestApp {
    pub state: AppState,
    pub search: Arc<StubSearch>,
    pub backend: Arc<LibSqlBackend>,
    _dir: TempDir,
}

pub(crate) async fn test_app(api_keys: Vec<String>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(api_keys, &dir.path().join("api.db")));

    let db = Database::new(&config.database).await.unwrap();
    let backend = Arc::new(LibSqlBackend::new(db));
    let search = Arc::new(StubSearch {
        calls: AtomicUsize::new(0),
    });

    let orchestrator = Arc::new(ResearchOrchestrator::new(
        &config,
        Collaborators {
            store: backend.clone(),
            searcher: search.clone(),
            text: Arc::new(StubText),
            images: None,
        },
    ));
    let llm = LlmProvider::new(config.llm.as_ref());

    TestApp {
        state: AppState::new(config, backend.clone(), llm, orchestrator),
        search,
        backend,
        _dir: dir,
    }
}
