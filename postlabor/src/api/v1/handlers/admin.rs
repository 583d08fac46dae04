//! v1 Admin handlers.

use axum::extract::State;

use crate::api::v1::dto::{CleanupRequest, CleanupResponse, DeleteAllResponse};
use crate::api::v1::response::ApiResponse;
use crate::api::{AppJson, AppState};

/// `POST /api/v1/admin/cleanup`
///
/// Deletes everything but the newest `keepCount` records.
#[utoipa::path(
    post,
    path = "/api/v1/admin/cleanup",
    tag = "admin",
    operation_id = "admin.cleanup",
    request_body = CleanupRequest,
    responses(
        (status = 200, description = "Cleanup finished", body = CleanupResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cleanup_research(
    State(state): State<AppState>,
    AppJson(req): AppJson<CleanupRequest>,
) -> ApiResponse<CleanupResponse> {
    let keep = req
        .keep_count
        .unwrap_or(state.config.research.retention_keep_count);

    let deleted = match state.store.cleanup_old_research(keep).await {
        Ok(deleted) => deleted,
        Err(e) => return e.into(),
    };
    let remaining = match state.store.count_research().await {
        Ok(count) => count,
        Err(e) => return e.into(),
    };

    ApiResponse::success(CleanupResponse { deleted, remaining })
}

/// `DELETE /api/v1/admin/research`
#[utoipa::path(
    delete,
    path = "/api/v1/admin/research",
    tag = "admin",
    operation_id = "admin.deleteAll",
    responses(
        (status = 200, description = "All research deleted", body = DeleteAllResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_all_research(State(state): State<AppState>) -> ApiResponse<DeleteAllResponse> {
    match state.store.delete_all_research().await {
        Ok(deleted) => {
            tracing::warn!(deleted, "Deleted all research records");
            ApiResponse::success(DeleteAllResponse { deleted })
        }
        Err(e) => e.into(),
    }
}
