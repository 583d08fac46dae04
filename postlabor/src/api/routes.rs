use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::v1;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = v1::router::v1_router(state.clone());

    Router::new()
        .route("/", get(service_index))
        .nest("/api/v1", v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service status and a map of the main endpoints.
async fn service_index() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": "postlabor",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "research": "/api/v1/research",
            "trigger": "/api/v1/research:run",
            "fresh": "/api/v1/research:fresh",
            "topics": "/api/v1/research/topics",
            "history": "/api/v1/research/history",
            "health": "/api/v1/health",
            "docs": "/api/v1/docs"
        }
    }))
}
