//! Admin DTOs for the v1 API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/admin/cleanup`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    /// Number of newest records to keep. Defaults to the configured
    /// retention count.
    pub keep_count: Option<u32>,
}

/// Response for `POST /v1/admin/cleanup`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted: u64,
    pub remaining: u64,
}

/// Response for `DELETE /v1/admin/research`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllResponse {
    pub deleted: u64,
}
