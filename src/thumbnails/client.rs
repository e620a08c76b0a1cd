//! HTTP Image Generator
//!
//! [`ImageGenerator`] backed by an OpenAI-compatible images endpoint.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{GenerationError, ImageGenerator};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Image generation can take well over a minute for large models.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

pub struct HttpImageGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpImageGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("image client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        config
            .image_api_key
            .as_deref()
            .map(|key| Self::new(&config.image_api_url, key, &config.image_model))
            .transpose()
    }
}

/// Maps a non-success status to a retryable or permanent failure.
pub fn classify_status(status: u16, detail: &str) -> GenerationError {
    match status {
        429 => GenerationError::RateLimited,
        408 | 500..=599 => GenerationError::Network(format!("HTTP {}: {}", status, detail)),
        _ => GenerationError::Rejected(format!("HTTP {}: {}", status, detail)),
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, prompt: &str) -> std::result::Result<Vec<u8>, GenerationError> {
        let body = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: "1024x1024",
            response_format: "b64_json",
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), detail.trim()));
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Network(format!("unreadable response: {}", e)))?;

        let encoded = parsed
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or_else(|| GenerationError::Rejected("response carried no image".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| GenerationError::Rejected(format!("invalid image payload: {}", e)))
    }
}
