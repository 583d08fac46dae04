use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{PostlaborError, Result};
use crate::llm::api::LlmApiClient;
use crate::llm::TextGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Chat-completion provider shared by the summarization and illustration
/// steps. Missing configuration leaves it unavailable instead of failing
/// startup.
#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
    client: Option<Arc<LlmApiClient>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => match &config.base_url {
                Some(base_url) => LlmBackend::OpenAICompatible {
                    base_url: base_url.clone(),
                },
                None => {
                    return Self::unavailable(&format!(
                        "Unknown provider in model: {}",
                        config.model
                    ))
                }
            },
        };

        let client = match LlmApiClient::new(config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::warn!(model = %config.model, error = %e, "LLM client could not be created");
                return Self::unavailable(&e.to_string());
            }
        };

        Self {
            backend,
            config: Some(Arc::new(config.clone())),
            client: Some(client),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.client.as_deref().map(LlmApiClient::base_url)
    }

    pub fn model(&self) -> Option<&str> {
        self.client.as_deref().map(LlmApiClient::model)
    }

    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        let client = self
            .client
            .as_deref()
            .ok_or_else(|| PostlaborError::LlmUnavailable(self.unavailable_reason()))?;

        client.complete(prompt, system_prompt, options).await
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM client is not initialized".to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for LlmProvider {
    async fn generate(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let options = CompletionOptions {
            temperature: self.config().map(|c| c.temperature),
            max_tokens: Some(max_tokens),
        };

        self.complete(prompt, Some(system), Some(&options)).await
    }
}
