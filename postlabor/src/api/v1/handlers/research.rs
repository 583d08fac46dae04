//! v1 Research handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Query;

use crate::api::v1::dto::{
    BatchResponse, FreshResearchRequest, ListResearchQuery, ListResearchResponse,
    ResearchResponse, RunResearchRequest, TopicHistoryResponse, TopicsResponse,
};
use crate::api::v1::response::{ApiResponse, ErrorCode, ResponseMeta};
use crate::api::{AppJson, AppState};
use crate::models::BatchSummary;

const DEFAULT_LIST_LIMIT: u32 = 10;
const MAX_LIST_LIMIT: u32 = 50;
const DEFAULT_FRESH_COUNT: usize = 3;
const MAX_FRESH_COUNT: usize = 20;

/// `GET /api/v1/research`
///
/// Newest records first.
#[utoipa::path(
    get,
    path = "/api/v1/research",
    tag = "research",
    operation_id = "research.list",
    params(ListResearchQuery),
    responses(
        (status = 200, description = "Latest research", body = ListResearchResponse),
    )
)]
pub async fn list_research(
    State(state): State<AppState>,
    Query(query): Query<ListResearchQuery>,
) -> ApiResponse<ListResearchResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let records = match state.store.get_latest_research(limit, offset).await {
        Ok(records) => records,
        Err(e) => return e.into(),
    };
    let total = match state.store.count_research().await {
        Ok(total) => total,
        Err(e) => return e.into(),
    };

    let returned = records.len() as u32;
    let next_offset =
        Some(offset + returned).filter(|next| returned > 0 && u64::from(*next) < total);

    let research: Vec<ResearchResponse> = records.into_iter().map(Into::into).collect();
    ApiResponse::success_with_meta(
        ListResearchResponse {
            count: research.len(),
            research,
        },
        ResponseMeta {
            total: Some(total),
            next_offset,
        },
    )
}

/// `GET /api/v1/research/{id}`
#[utoipa::path(
    get,
    path = "/api/v1/research/{id}",
    tag = "research",
    operation_id = "research.get",
    params(("id" = i64, Path, description = "Research record ID")),
    responses(
        (status = 200, description = "Research record", body = ResearchResponse),
        (status = 404, description = "Not found", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn get_research(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResponse<ResearchResponse> {
    match state.store.get_research_by_id(id).await {
        Ok(Some(record)) => ApiResponse::success(record.into()),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Research {id} not found")),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/research/{id}/image`
///
/// Raw bytes of the embedded illustration. The content type is sniffed from
/// the bytes.
#[utoipa::path(
    get,
    path = "/api/v1/research/{id}/image",
    tag = "research",
    operation_id = "research.image",
    params(("id" = i64, Path, description = "Research record ID")),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "image/png"),
        (status = 404, description = "No embedded image", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn get_research_image(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let record = match state.store.get_research_by_id(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return ApiResponse::<()>::error(ErrorCode::NotFound, format!("Research {id} not found"))
                .into_response()
        }
        Err(e) => return ApiResponse::<()>::from(e).into_response(),
    };

    match record.image_data {
        Some(bytes) if !bytes.is_empty() => {
            let mime = infer::get(&bytes)
                .map(|kind| kind.mime_type())
                .unwrap_or("application/octet-stream");
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        _ => ApiResponse::<()>::error(
            ErrorCode::NotFound,
            format!("Research {id} has no embedded image"),
        )
        .into_response(),
    }
}

/// `POST /api/v1/research:run`
///
/// Researches one topic, or the whole configured pool when `topic` is
/// omitted. Blocks until the run finishes; concurrent triggers queue behind
/// the running one.
#[utoipa::path(
    post,
    path = "/api/v1/research:run",
    tag = "research",
    operation_id = "research.run",
    request_body = RunResearchRequest,
    responses(
        (status = 200, description = "Run finished", body = BatchResponse),
        (status = 400, description = "Invalid request", body = crate::api::v1::response::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn run_research(
    State(state): State<AppState>,
    AppJson(req): AppJson<RunResearchRequest>,
) -> ApiResponse<BatchResponse> {
    let options = req
        .settings
        .into_options(state.orchestrator.scheduled_options());

    let summary = match req.topic.as_deref().map(str::trim) {
        Some("") => {
            return ApiResponse::error(ErrorCode::InvalidRequest, "Topic cannot be empty");
        }
        Some(topic) => {
            let outcome = state.orchestrator.run_topic(topic, options).await;
            BatchSummary::from_outcomes(vec![outcome])
        }
        None => state.orchestrator.run_all(options).await,
    };

    ApiResponse::success(summary.into())
}

/// `POST /api/v1/research:fresh`
///
/// Picks `count` topics that overlap little with recent history and
/// researches them.
#[utoipa::path(
    post,
    path = "/api/v1/research:fresh",
    tag = "research",
    operation_id = "research.fresh",
    request_body = FreshResearchRequest,
    responses(
        (status = 200, description = "Run finished", body = BatchResponse),
        (status = 400, description = "Invalid request", body = crate::api::v1::response::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn run_fresh_research(
    State(state): State<AppState>,
    AppJson(req): AppJson<FreshResearchRequest>,
) -> ApiResponse<BatchResponse> {
    let count = req.count.unwrap_or(match state.config.research.selection_count {
        0 => DEFAULT_FRESH_COUNT,
        n => n,
    });
    if !(1..=MAX_FRESH_COUNT).contains(&count) {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("count must be between 1 and {MAX_FRESH_COUNT}"),
        );
    }

    let options = req
        .settings
        .into_options(state.orchestrator.scheduled_options());
    let summary = state.orchestrator.run_fresh(count, options).await;

    ApiResponse::success(summary.into())
}

/// `GET /api/v1/research/topics`
#[utoipa::path(
    get,
    path = "/api/v1/research/topics",
    tag = "research",
    operation_id = "research.topics",
    responses(
        (status = 200, description = "Configured topic pools", body = TopicsResponse),
    )
)]
pub async fn list_topics(State(state): State<AppState>) -> ApiResponse<TopicsResponse> {
    let research = &state.config.research;
    ApiResponse::success(TopicsResponse {
        mode: research.mode,
        topics: research.topics.clone(),
        news_queries: research.news_queries.clone(),
    })
}

/// `GET /api/v1/research/history`
#[utoipa::path(
    get,
    path = "/api/v1/research/history",
    tag = "research",
    operation_id = "research.history",
    responses(
        (status = 200, description = "Distinct researched topics", body = TopicHistoryResponse),
    )
)]
pub async fn topic_history(State(state): State<AppState>) -> ApiResponse<TopicHistoryResponse> {
    match state.store.list_topics().await {
        Ok(entries) => {
            let history: Vec<_> = entries.into_iter().map(Into::into).collect();
            ApiResponse::success(TopicHistoryResponse {
                count: history.len(),
                history,
            })
        }
        Err(e) => e.into(),
    }
}
