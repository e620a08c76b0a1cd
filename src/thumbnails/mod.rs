//! Thumbnails Module
//!
//! World thumbnail generation through a rate-limited image service.
//!
//! The image service allows only a handful of requests per minute, so every
//! call goes through [`retry_with_backoff`](crate::retry::retry_with_backoff).

mod client;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::retry::{retry_transient, RetryError, RetryPolicy, Transient};

pub use client::{classify_status, HttpImageGenerator};

// == Generation Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Request quota exceeded
    #[error("rate limited by image service")]
    RateLimited,

    /// Connection or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// The service refused the prompt
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl Transient for GenerationError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited | GenerationError::Network(_)
        )
    }
}

// == Image Generator ==
/// A text-to-image backend.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns encoded image bytes for `prompt`.
    async fn generate(&self, prompt: &str) -> std::result::Result<Vec<u8>, GenerationError>;
}

// == Thumbnail ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Object-storage key the image belongs under
    pub object_key: String,
    pub image: Vec<u8>,
}

/// Builds the image prompt for a world description.
pub fn world_thumbnail_prompt(description: &str) -> String {
    format!(
        "A square thumbnail illustration of a fictional world, no text or lettering. \
         The world is described as follows: {}",
        description.trim()
    )
}

/// Storage key for the thumbnail of `world_id`.
pub fn thumbnail_object_key(world_id: &str) -> String {
    format!("thumbnails/{}.jpeg", world_id)
}

// == Thumbnail Service ==
#[derive(Clone)]
pub struct ThumbnailService {
    generator: Arc<dyn ImageGenerator>,
    policy: RetryPolicy,
}

impl ThumbnailService {
    pub fn new(generator: Arc<dyn ImageGenerator>, policy: RetryPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { generator, policy })
    }

    /// Generates the thumbnail for a world, retrying transient failures.
    ///
    /// Cancelling `cancel` abandons any pending retry.
    pub async fn generate(
        &self,
        world_id: &str,
        description: &str,
        cancel: &CancellationToken,
    ) -> Result<Thumbnail> {
        if world_id.trim().is_empty() {
            return Err(AppError::InvalidRequest("world id cannot be empty".to_string()));
        }
        if description.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "description cannot be empty".to_string(),
            ));
        }

        let prompt = world_thumbnail_prompt(description);
        let image = retry_transient(&self.policy, cancel, || self.generator.generate(&prompt))
            .await
            .map_err(|err| {
                warn!("Thumbnail generation for world {} failed: {}", world_id, err);
                match err {
                    RetryError::Permanent {
                        source: GenerationError::Rejected(reason),
                        ..
                    } => AppError::InvalidRequest(reason),
                    cancelled @ RetryError::Cancelled { .. } => {
                        AppError::Unavailable(cancelled.to_string())
                    }
                    other => AppError::Upstream(other.to_string()),
                }
            })?;

        info!(
            "Generated thumbnail for world {} ({} bytes)",
            world_id,
            image.len()
        );

        Ok(Thumbnail {
            object_key: thumbnail_object_key(world_id),
            image,
        })
    }
}
