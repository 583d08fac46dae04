use axum::extract::State;
use serde::Serialize;

use crate::api::v1::response::ApiResponse;
use crate::api::AppState;
use crate::llm::LlmBackend;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub llm: LlmStatus,
    pub search: ProviderStatus,
    pub images: ProviderStatus,
    /// Topic runs started since the process came up.
    pub runs_started: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// `configured` or `disabled`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProviderStatus {
    pub status: String,
}

impl ProviderStatus {
    fn from_flag(configured: bool) -> Self {
        let status = if configured { "configured" } else { "disabled" };
        Self {
            status: status.to_string(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PingData {
    pub pong: bool,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let database = match state.store.count_research().await {
        Ok(_) => DatabaseStatus {
            status: "ok".to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            DatabaseStatus {
                status: "error".to_string(),
            }
        }
    };

    let llm = if state.llm.is_available() {
        let provider = match state.llm.backend() {
            LlmBackend::OpenAI => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::LmStudio => "lmstudio",
            LlmBackend::OpenAICompatible { .. } => "openai-compatible",
            LlmBackend::Unavailable { .. } => "unavailable",
        };
        LlmStatus {
            status: "available".to_string(),
            provider: Some(provider.to_string()),
            model: state.llm.model().map(str::to_string),
        }
    } else {
        LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
            model: None,
        }
    };

    let image = &state.config.image;
    let status = if database.status == "ok" {
        "healthy"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthData {
        status: status.to_string(),
        service: "postlabor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        llm,
        search: ProviderStatus::from_flag(state.config.search.api_key.is_some()),
        images: ProviderStatus::from_flag(image.enabled && image.api_key.is_some()),
        runs_started: state.orchestrator.runs_started(),
    })
}

/// `GET /api/v1/ping`
///
/// Keep-alive for hosts that idle sleeping services.
#[utoipa::path(
    get,
    path = "/api/v1/ping",
    tag = "health",
    responses(
        (status = 200, description = "Pong", body = PingData),
    )
)]
pub async fn ping() -> ApiResponse<PingData> {
    ApiResponse::success(PingData { pong: true })
}
