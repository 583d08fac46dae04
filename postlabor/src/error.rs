use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostlaborError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Image generation error: {0}")]
    Image(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },
}

impl IntoResponse for PostlaborError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PostlaborError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            PostlaborError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PostlaborError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            PostlaborError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            PostlaborError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            PostlaborError::UrlParse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            PostlaborError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            PostlaborError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            PostlaborError::Search(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PostlaborError::SearchUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            PostlaborError::Image(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PostlaborError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PostlaborError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            PostlaborError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PostlaborError>;
