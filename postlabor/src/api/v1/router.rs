use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let research = Router::new()
        .route("/", get(handlers::research::list_research))
        .route("/topics", get(handlers::research::list_topics))
        .route("/history", get(handlers::research::topic_history))
        .route("/{id}", get(handlers::research::get_research))
        .route("/{id}/image", get(handlers::research::get_research_image));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ping", get(handlers::ping))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .nest("/research", research)
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .route("/research:run", post(handlers::research::run_research))
        .route("/research:fresh", post(handlers::research::run_fresh_research))
        .route("/admin/cleanup", post(handlers::admin::cleanup_research))
        .route("/admin/research", delete(handlers::admin::delete_all_research))
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
