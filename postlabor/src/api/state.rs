use std::sync::Arc;

use crate::config::Config;
use crate::db::{DatabaseBackend, ResearchStore};
use crate::llm::LlmProvider;
use crate::research::ResearchOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub store: Arc<dyn ResearchStore>,
    pub llm: LlmProvider,
    pub orchestrator: Arc<ResearchOrchestrator>,
}

impl AppState {
    pub fn new<B>(
        config: Arc<Config>,
        backend: Arc<B>,
        llm: LlmProvider,
        orchestrator: Arc<ResearchOrchestrator>,
    ) -> Self
    where
        B: DatabaseBackend + 'static,
    {
        let db: Arc<dyn DatabaseBackend> = backend.clone();
        let store: Arc<dyn ResearchStore> = backend;

        Self {
            config,
            db,
            store,
            llm,
            orchestrator,
        }
    }
}
