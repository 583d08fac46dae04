use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ImageConfig;
use crate::error::{PostlaborError, Result};
use crate::illustration::{GeneratedImage, ImageGenerator};

/// Client for OpenAI-compatible `/images/generations` endpoints.
#[derive(Clone)]
pub struct ImageApiClient {
    api_key: Option<String>,
    endpoint: String,
    model: String,
    size: String,
    quality: String,
    style: String,
    embed_bytes: bool,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
    revised_prompt: Option<String>,
}

impl ImageApiClient {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PostlaborError::Image(format!("Failed to create image client: {e}")))?;

        Ok(Self {
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            endpoint: format!(
                "{}/images/generations",
                config.base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
            size: config.size.clone(),
            quality: config.quality.clone(),
            style: config.style.clone(),
            embed_bytes: config.embed_bytes,
            client,
        })
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PostlaborError::Image(format!(
                "Image download returned HTTP {status}"
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for ImageApiClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PostlaborError::Image("No image API key configured".to_string()))?;

        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            quality: &self.quality,
            style: &self.style,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostlaborError::Image(format!(
                "Image API returned HTTP {status}"
            )));
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| PostlaborError::Image(format!("Invalid image API response: {e}")))?;

        let datum = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| PostlaborError::Image("Image API returned no images".to_string()))?;

        let data = match (&datum.url, self.embed_bytes) {
            (Some(url), true) => match self.fetch_bytes(url).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to download generated image, keeping URL only");
                    None
                }
            },
            _ => None,
        };

        Ok(GeneratedImage {
            url: datum.url,
            revised_prompt: datum.revised_prompt.filter(|p| !p.trim().is_empty()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_availability() {
        let config = ImageConfig {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..Default::default()
        };
        let client = ImageApiClient::new(&config).unwrap();

        assert_eq!(client.endpoint, "http://localhost:1234/v1/images/generations");
        assert!(!client.is_available());
    }

    #[tokio::test]
    async fn test_generate_without_key_fails() {
        let client = ImageApiClient::new(&ImageConfig::default()).unwrap();
        let result = client.generate_image("city at dusk").await;
        assert!(matches!(result, Err(PostlaborError::Image(_))));
    }
}
