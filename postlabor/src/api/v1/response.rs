//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope with three
//! optional top-level fields:
//!
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "total": 42, "nextOffset": 10 },
//!   "error": { "code": "not_found", "message": "..." }
//! }
//! ```
//!
//! `data` is present on success and `error` on failure, never both.
//! List endpoints page with `limit`/`offset`; `meta.nextOffset` is absent
//! on the last page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::PostlaborError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed request or failed validation. HTTP 400.
    InvalidRequest,
    /// Missing or invalid credentials. HTTP 401.
    Unauthorized,
    /// The requested resource does not exist. HTTP 404.
    NotFound,
    /// Too many upstream requests. HTTP 429.
    RateLimited,
    /// An unexpected server-side error occurred. Internal details are never
    /// leaked to the client. HTTP 500.
    InternalError,
    /// An upstream provider (search, model, image) failed. HTTP 502.
    UpstreamError,
    /// A required provider is not configured. HTTP 503.
    Unavailable,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::InternalError => write!(f, "internal_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Total number of stored items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Offset to request for the next page. `None` on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u32>,
}

/// Canonical v1 API response envelope.
///
/// The HTTP status code is derived from the error code (on error) or
/// from the constructor used on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Success response with data and pagination metadata (HTTP 200).
    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Resource created response (HTTP 201).
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize v1 response");
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<PostlaborError> for ApiResponse<T> {
    /// Convert a [`PostlaborError`] into a v1 [`ApiResponse`].
    ///
    /// Database and internal failures are logged and replaced with a generic
    /// message. Upstream failures keep only their category.
    fn from(err: PostlaborError) -> Self {
        match err {
            PostlaborError::NotFound(msg) => ApiResponse::error(ErrorCode::NotFound, msg),

            PostlaborError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),

            PostlaborError::ApiAuth(_) => {
                ApiResponse::error(ErrorCode::Unauthorized, "Authentication required")
            }

            PostlaborError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            PostlaborError::UrlParse(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid URL: {e}"))
            }

            PostlaborError::LlmRateLimit { retry_after } => {
                let msg = match retry_after {
                    Some(secs) => format!("Rate limit exceeded, retry after {secs} seconds"),
                    None => "Rate limit exceeded".to_string(),
                };
                ApiResponse::error(ErrorCode::RateLimited, msg)
            }

            PostlaborError::LlmUnavailable(msg) | PostlaborError::SearchUnavailable(msg) => {
                ApiResponse::error(ErrorCode::Unavailable, msg)
            }

            ref upstream @ (PostlaborError::Search(_)
            | PostlaborError::Image(_)
            | PostlaborError::Llm(_)
            | PostlaborError::Http(_)) => {
                tracing::warn!(error = %upstream, "Upstream error mapped to v1 response");
                ApiResponse::error(ErrorCode::UpstreamError, "An upstream provider failed")
            }

            ref internal @ (PostlaborError::Database(_) | PostlaborError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}
