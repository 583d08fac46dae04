mod client;
mod illustrator;

use async_trait::async_trait;

use crate::error::Result;

pub use client::ImageApiClient;
pub use illustrator::{clean_image_prompt, IllustrationResult, Illustrator};

/// Output of one image synthesis call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedImage {
    pub url: Option<String>,
    /// Prompt as rewritten by the provider, when it reports one.
    pub revised_prompt: Option<String>,
    pub data: Option<Vec<u8>>,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}
