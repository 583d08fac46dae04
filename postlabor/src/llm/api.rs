use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use reqwest::StatusCode;

use crate::{
    config::{parse_llm_provider_model, LlmConfig},
    error::{PostlaborError, Result},
    llm::provider::CompletionOptions,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

/// Single-shot chat completion client for OpenAI-compatible endpoints.
///
/// Every call is made exactly once. A failed research step falls back at
/// the step boundary instead of being retried here.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    base_url: String,
    model: String,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let (provider, model) = parse_llm_provider_model(&config.model);
        let provider = provider.to_lowercase();

        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if api_key.is_none() && !matches!(provider.as_str(), "ollama" | "local" | "lmstudio") {
            return Err(PostlaborError::Llm(
                "API key required for this provider".to_string(),
            ));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(&provider).to_string());
        let model = if provider == "local" {
            config.model.clone()
        } else {
            model.to_string()
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PostlaborError::Llm(format!("Failed to create LLM HTTP client: {e}")))?;

        // A zero elapsed-time budget turns off async-openai's internal retries.
        let no_retry = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_base(base_url.clone())
                .with_api_key(api_key.unwrap_or_default()),
        )
        .with_http_client(http_client)
        .with_backoff(no_retry);

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(PostlaborError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt, system_prompt, options)?;
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_error)?;

        first_choice_text(response)
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<CreateChatCompletionRequest> {
        let invalid = |what: &str, e: OpenAIError| {
            PostlaborError::Validation(format!("Invalid {what}: {e}"))
        };

        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
            let message = ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| invalid("system prompt", e))?;
            messages.push(message.into());
        }
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| invalid("user prompt", e))?;
        messages.push(user.into());

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.model.clone()).messages(messages);
        if let Some(options) = options {
            if let Some(temperature) = options.temperature {
                request.temperature(temperature);
            }
            if let Some(max_tokens) = options.max_tokens {
                request.max_tokens(max_tokens);
            }
        }

        request
            .build()
            .map_err(|e| invalid("LLM completion request", e))
    }
}

fn first_choice_text(response: CreateChatCompletionResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PostlaborError::Llm(
            "LLM response contained no content".to_string(),
        ));
    }
    Ok(text)
}

/// Map a provider failure onto the crate error: rate limits and quota
/// exhaustion become `LlmRateLimit`, rejected credentials an
/// "authentication failed" `Llm` error, everything else a plain `Llm` error.
fn classify_error(error: OpenAIError) -> PostlaborError {
    match &error {
        OpenAIError::Reqwest(e) if e.status() == Some(StatusCode::TOO_MANY_REQUESTS) => {
            return PostlaborError::LlmRateLimit { retry_after: None }
        }
        OpenAIError::Reqwest(e)
            if e.status() == Some(StatusCode::UNAUTHORIZED)
                || e.status() == Some(StatusCode::FORBIDDEN) =>
        {
            return PostlaborError::Llm(format!("LLM authentication failed: {e}"))
        }
        OpenAIError::ApiError(api) if is_rate_limit(api) => {
            return PostlaborError::LlmRateLimit { retry_after: None }
        }
        OpenAIError::ApiError(api) if is_auth_failure(api) => {
            return PostlaborError::Llm(format!("LLM authentication failed: {api}"))
        }
        _ => {}
    }

    match error {
        OpenAIError::Reqwest(e) => PostlaborError::Llm(format!("LLM request failed: {e}")),
        OpenAIError::ApiError(api) => PostlaborError::Llm(format!("LLM API error: {api}")),
        OpenAIError::JSONDeserialize(e) => {
            PostlaborError::Llm(format!("Failed to parse LLM response: {e}"))
        }
        OpenAIError::InvalidArgument(message) => PostlaborError::Validation(message),
        other => PostlaborError::Llm(other.to_string()),
    }
}

/// Lowercased message, type and code of an API error.
fn api_error_text(api: &ApiError) -> [String; 3] {
    [
        api.message.to_lowercase(),
        api.r#type.as_deref().unwrap_or_default().to_lowercase(),
        api.code.as_deref().unwrap_or_default().to_lowercase(),
    ]
}

fn is_rate_limit(api: &ApiError) -> bool {
    let [message, kind, code] = api_error_text(api);
    message.contains("rate limit")
        || message.contains("too many requests")
        || kind.contains("rate_limit")
        || code.contains("rate_limit")
        || code == "insufficient_quota"
}

fn is_auth_failure(api: &ApiError) -> bool {
    let [message, kind, code] = api_error_text(api);
    ["unauthorized", "forbidden", "authentication", "invalid api key"]
        .iter()
        .any(|needle| message.contains(needle))
        || code.contains("invalid_api_key")
        || code.contains("authentication")
        || kind.contains("authentication")
}

fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => LMSTUDIO_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}
