//! # V1 API Key Authentication Middleware
//!
//! Guards the mutating v1 routes (research triggers and admin operations)
//! with Bearer token authentication against `POSTLABOR_API_KEYS`. Read
//! routes are mounted outside this layer.
//!
//! Errors use the v1 `ApiResponse` JSON envelope.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Axum middleware that enforces Bearer token authentication for v1 API routes.
///
/// # Behavior
///
/// - If `POSTLABOR_API_KEYS` is empty/unset → the request passes through.
///   Single-user deployments run open.
/// - If the `Authorization: Bearer <token>` header is missing or malformed → 401.
/// - If the token is not in the configured key list → 401.
/// - If the token is valid → passes the request through to the next handler.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.api_keys;
    if keys.is_empty() {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return ApiResponse::<()>::error(
                    ErrorCode::Unauthorized,
                    "Invalid authorization header format. Expected: Bearer <token>",
                )
                .into_response();
            }
        },
        None => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Missing authorization header",
            )
            .into_response();
        }
    };

    if keys.iter().any(|key| key == token) {
        next.run(request).await
    } else {
        tracing::debug!("Rejected request with unknown API key");
        ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid API key").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_app;
    use axum::http::StatusCode;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn build_test_app(api_keys: Vec<String>) -> Router {
        let app = test_app(api_keys).await;

        async fn protected_handler() -> &'static str {
            "protected"
        }

        async fn health_handler() -> &'static str {
            "healthy"
        }

        let public_routes = Router::new().route("/health", get(health_handler));

        let protected_routes = Router::new()
            .route("/protected", get(protected_handler))
            .route_layer(middleware::from_fn_with_state(
                app.state.clone(),
                v1_auth_middleware,
            ));

        Router::new()
            .merge(public_routes)
            .merge(protected_routes)
            .with_state(app.state)
    }

    fn request(auth: Option<&str>, uri: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// Parses JSON error envelope from response body.
    async fn parse_error_body(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_v1_auth_open_when_no_keys_configured() {
        let app = build_test_app(vec![]).await;

        let response = app.oneshot(request(None, "/protected")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_v1_auth_allows_with_valid_key() {
        let app = build_test_app(vec!["other".to_string(), "test-key-v1".to_string()]).await;

        let response = app
            .oneshot(request(Some("Bearer test-key-v1"), "/protected"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_v1_auth_rejects_invalid_key() {
        let app = build_test_app(vec!["test-key-v1".to_string()]).await;

        let response = app
            .oneshot(request(Some("Bearer wrong-key"), "/protected"))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "unauthorized");
        assert_eq!(json["error"]["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn test_v1_auth_rejects_missing_header() {
        let app = build_test_app(vec!["test-key-v1".to_string()]).await;

        let response = app.oneshot(request(None, "/protected")).await.unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["message"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_v1_auth_rejects_non_bearer_scheme() {
        let app = build_test_app(vec!["test-key-v1".to_string()]).await;

        let response = app
            .oneshot(request(Some("Basic dGVzdA=="), "/protected"))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Expected: Bearer"));
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_v1_health_accessible_without_key_when_keys_configured() {
        let app = build_test_app(vec!["secret-key".to_string()]).await;

        let response = app.oneshot(request(None, "/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
