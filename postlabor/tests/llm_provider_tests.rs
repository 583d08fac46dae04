use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use postlabor::config::LlmConfig;
use postlabor::error::PostlaborError;
use postlabor::llm::{LlmApiClient, LlmBackend, LlmProvider, TextGenerator};

fn llm_config(model: &str) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
        base_url: None,
        timeout_secs: 30,
        temperature: 0.7,
    }
}

fn llm_config_with_base_url(model: &str, base_url: String) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
        temperature: 0.5,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

fn api_error_body(message: &str, error_type: &str, code: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": serde_json::Value::Null,
            "code": code
        }
    })
}

#[test]
fn test_openai_provider_detection() {
    let config = llm_config("openai/gpt-4o-mini");
    let provider = LlmProvider::new(Some(&config));

    assert!(matches!(provider.backend(), LlmBackend::OpenAI));
    assert_eq!(provider.base_url(), Some("https://api.openai.com/v1"));
    assert_eq!(provider.model(), Some("gpt-4o-mini"));
}

#[test]
fn test_openrouter_provider_detection() {
    let config = llm_config("openrouter/openai/gpt-4o");
    let provider = LlmProvider::new(Some(&config));

    assert!(matches!(provider.backend(), LlmBackend::OpenRouter));
    assert_eq!(provider.base_url(), Some("https://openrouter.ai/api/v1"));
    assert_eq!(provider.model(), Some("openai/gpt-4o"));
}

#[test]
fn test_ollama_provider_detection() {
    let mut config = llm_config("ollama/llama3.2");
    config.api_key = None;
    let provider = LlmProvider::new(Some(&config));

    assert!(matches!(provider.backend(), LlmBackend::Ollama));
    assert!(provider.is_available());
    assert_eq!(provider.base_url(), Some("http://localhost:11434/v1"));
}

#[test]
fn test_unavailable_provider() {
    let provider = LlmProvider::new(None);

    assert!(matches!(provider.backend(), LlmBackend::Unavailable { .. }));
    assert!(!provider.is_available());
    assert!(provider.config().is_none());
}

#[test]
fn test_provider_clone() {
    let config = llm_config("openrouter/openai/gpt-4o-mini");
    let provider = LlmProvider::new(Some(&config));
    let cloned = provider.clone();

    assert!(matches!(cloned.backend(), LlmBackend::OpenRouter));
    assert!(cloned.is_available());
    assert_eq!(
        cloned.config().map(|c| c.model.as_str()),
        Some(config.model.as_str())
    );
}

#[test]
fn test_api_client_uses_provider_default_base_url() {
    let config = llm_config("openrouter/openai/gpt-4o-mini");
    let client = LlmApiClient::new(&config);

    match client {
        Ok(value) => assert_eq!(value.base_url(), "https://openrouter.ai/api/v1"),
        Err(error) => panic!("Expected API client creation to succeed, got: {error}"),
    }
}

#[tokio::test]
async fn test_complete_returns_response_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello from mock")))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config_with_base_url("openai/gpt-4o-mini", format!("{}/v1", server.uri()));
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Hello", None, None).await;

    match result {
        Ok(value) => assert_eq!(value, "Hello from mock"),
        Err(error) => panic!("Expected completion to succeed, got: {error}"),
    }
}

#[tokio::test]
async fn test_generate_sends_system_prompt_and_limits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 150,
            "temperature": 0.5,
            "messages": [
                { "role": "system", "content": "You are a research analyst." }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{\"summary\": \"ok\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config_with_base_url("openai/gpt-4o-mini", format!("{}/v1", server.uri()));
    let provider = LlmProvider::new(Some(&config));

    let reply = provider
        .generate("You are a research analyst.", "Summarize robot tax news", 150)
        .await
        .expect("generation should succeed");

    assert_eq!(reply, "{\"summary\": \"ok\"}");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_mock = Arc::clone(&attempts);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(move |_request: &Request| {
            attempts_for_mock.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(500).set_body_json(api_error_body(
                "The server had an error while processing your request",
                "server_error",
                "server_error",
            ))
        })
        .mount(&server)
        .await;

    let config = llm_config_with_base_url("openai/gpt-4o-mini", format!("{}/v1", server.uri()));
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Retry test", None, None).await;

    assert!(matches!(result, Err(PostlaborError::Llm(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_too_many_requests_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(api_error_body(
            "Rate limit reached for requests",
            "requests",
            "rate_limit_exceeded",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config_with_base_url("openai/gpt-4o-mini", format!("{}/v1", server.uri()));
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Rate limit test", None, None).await;

    assert!(matches!(
        result,
        Err(PostlaborError::LlmRateLimit { retry_after: None })
    ));
}

#[tokio::test]
async fn test_rate_limit_handling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(api_error_body(
                    "Rate limit exceeded",
                    "insufficient_quota",
                    "insufficient_quota",
                )),
        )
        .mount(&server)
        .await;

    let config = llm_config_with_base_url("openai/gpt-4o-mini", format!("{}/v1", server.uri()));
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Rate limit test", None, None).await;

    assert!(matches!(
        result,
        Err(PostlaborError::LlmRateLimit { retry_after: None })
    ));
}

#[tokio::test]
async fn test_auth_error_returns_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(api_error_body(
            "Invalid API key",
            "invalid_request_error",
            "invalid_api_key",
        )))
        .mount(&server)
        .await;

    let config = llm_config_with_base_url("openai/gpt-4o-mini", format!("{}/v1", server.uri()));
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Auth test", None, None).await;

    match result {
        Err(PostlaborError::Llm(message)) => {
            assert!(message.to_lowercase().contains("authentication failed"));
        }
        other => panic!("Expected Llm auth error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_prompt_validation() {
    let config = llm_config("openai/gpt-4o-mini");
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("   ", None, None).await;

    match result {
        Err(PostlaborError::Validation(message)) => {
            assert!(message.contains("Prompt cannot be empty"));
        }
        other => panic!("Expected Validation error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_key_fails_fast_as_unavailable() {
    let mut config = llm_config("openai/gpt-4o");
    config.api_key = None;
    let provider = LlmProvider::new(Some(&config));

    let result = provider.generate("system", "prompt", 50).await;

    match result {
        Err(PostlaborError::LlmUnavailable(reason)) => {
            assert!(reason.contains("API key required"));
        }
        other => panic!("Expected LlmUnavailable, got: {other:?}"),
    }
}
