use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Post-Labor Research API",
        version = "1.0.0",
        description = "Periodic web research on post-labor economics: summaries, key statistics and illustrations.",
    ),
    paths(
        handlers::health::health_check,
        handlers::health::ping,
        handlers::research::list_research,
        handlers::research::get_research,
        handlers::research::get_research_image,
        handlers::research::run_research,
        handlers::research::run_fresh_research,
        handlers::research::list_topics,
        handlers::research::topic_history,
        handlers::admin::cleanup_research,
        handlers::admin::delete_all_research,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Common
        dto::common::RunSettings,
        crate::models::ResearchMode,
        crate::models::ResearchStatus,
        crate::models::Source,
        // Research
        dto::research::ListResearchQuery,
        dto::research::RunResearchRequest,
        dto::research::FreshResearchRequest,
        dto::research::ResearchResponse,
        dto::research::ListResearchResponse,
        dto::research::OutcomeResponse,
        dto::research::BatchResponse,
        dto::research::TopicsResponse,
        dto::research::TopicHistoryItem,
        dto::research::TopicHistoryResponse,
        // Admin
        dto::admin::CleanupRequest,
        dto::admin::CleanupResponse,
        dto::admin::DeleteAllResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::LlmStatus,
        handlers::health::ProviderStatus,
        handlers::health::PingData,
    )),
    tags(
        (name = "health", description = "Health check and keep-alive"),
        (name = "research", description = "Research records and run triggers"),
        (name = "admin", description = "Retention and deletion (auth required)"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
