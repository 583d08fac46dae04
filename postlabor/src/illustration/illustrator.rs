use std::sync::Arc;

use crate::illustration::ImageGenerator;
use crate::llm::prompts::{fallback_image_prompt, image_prompt_request, IMAGE_PROMPT_SYSTEM};
use crate::llm::TextGenerator;

/// Result of the illustration step. `prompt` is always set, even when no
/// image could be produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IllustrationResult {
    pub image_url: Option<String>,
    pub image_data: Option<Vec<u8>>,
    pub prompt: String,
}

impl IllustrationResult {
    pub fn has_image(&self) -> bool {
        self.image_url.is_some() || self.image_data.is_some()
    }
}

/// Two-stage illustration: ask the text model for an evocative prompt, then
/// hand it to the image model. Never fails.
pub struct Illustrator {
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    prompt_max_tokens: u32,
    prompt_max_chars: usize,
}

impl Illustrator {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        prompt_max_tokens: u32,
        prompt_max_chars: usize,
    ) -> Self {
        Self {
            text,
            images,
            prompt_max_tokens,
            prompt_max_chars,
        }
    }

    /// `summary` grounds the prompt in what the research found; it may be
    /// empty.
    pub async fn illustrate(&self, topic: &str, summary: &str) -> IllustrationResult {
        let prompt = self.image_prompt(topic, summary).await;

        match self.images.generate_image(&prompt).await {
            Ok(image) => {
                tracing::info!(topic, has_url = image.url.is_some(), "Generated illustration");
                IllustrationResult {
                    image_url: image.url,
                    image_data: image.data,
                    prompt: image.revised_prompt.unwrap_or(prompt),
                }
            }
            Err(e) => {
                tracing::warn!(topic, error = %e, "Image generation failed");
                IllustrationResult {
                    image_url: None,
                    image_data: None,
                    prompt,
                }
            }
        }
    }

    async fn image_prompt(&self, topic: &str, summary: &str) -> String {
        let raw = match self
            .text
            .generate(
                IMAGE_PROMPT_SYSTEM,
                &image_prompt_request(topic, summary),
                self.prompt_max_tokens,
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback_image_prompt(topic),
            Err(e) => {
                tracing::warn!(topic, error = %e, "Image prompt generation failed, using fallback");
                fallback_image_prompt(topic)
            }
        };

        clean_image_prompt(&raw, self.prompt_max_chars)
    }
}

/// Trim whitespace, then surrounding double quotes, then single quotes, and
/// cap the result at `max_chars` characters.
pub fn clean_image_prompt(raw: &str, max_chars: usize) -> String {
    raw.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .chars()
        .take(max_chars)
        .collect()
}
