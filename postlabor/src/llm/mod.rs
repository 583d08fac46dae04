mod api;
pub mod prompts;
mod provider;

use async_trait::async_trait;

use crate::error::Result;

pub use api::LlmApiClient;
pub use provider::{CompletionOptions, LlmBackend, LlmProvider};

/// Text generation seam used by the summarization and illustration steps.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String>;
}
