//! Shared DTO types used across multiple v1 API endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{ResearchMode, RunOptions};

/// Run switches accepted by every research trigger.
///
/// Omitted fields fall back to the scheduler's configured defaults, except
/// `force` which defaults to `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSettings {
    /// Research even when the topic was covered inside the cache window.
    #[serde(default)]
    pub force: bool,
    pub generate_images: Option<bool>,
    pub mode: Option<ResearchMode>,
}

impl RunSettings {
    pub fn into_options(self, defaults: RunOptions) -> RunOptions {
        RunOptions {
            force: self.force,
            generate_images: self.generate_images.unwrap_or(defaults.generate_images),
            mode: self.mode.unwrap_or(defaults.mode),
        }
    }
}
