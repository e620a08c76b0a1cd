//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{AppError, Result};
use crate::retry::RetryPolicy;

const DEFAULT_IMAGE_API_URL: &str = "https://api.openai.com/v1/images/generations";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the agent metadata cache
    pub agent_cache_capacity: usize,
    /// Capacity of the user metadata cache
    pub user_cache_capacity: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Optional JSON file seeding the in-memory directory
    pub agent_seed_file: Option<PathBuf>,
    /// Attempts allowed per image generation call
    pub retry_max_attempts: u32,
    /// First backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
    /// Backoff growth factor
    pub retry_multiplier: f64,
    /// Backoff ceiling in milliseconds
    pub retry_max_delay_ms: u64,
    /// Jitter ratio in [0, 1]
    pub retry_jitter: f64,
    /// Image generation endpoint
    pub image_api_url: String,
    /// Bearer token for the image endpoint; thumbnails are disabled without it
    pub image_api_key: Option<String>,
    /// Image model name sent with each request
    pub image_model: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AGENT_CACHE_CAPACITY` - Agent cache entries (default: 128)
    /// - `USER_CACHE_CAPACITY` - User cache entries (default: 128)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `AGENT_SEED_FILE` - Seed file for the directory (default: unset)
    /// - `RETRY_MAX_ATTEMPTS` - Image generation attempts (default: 5)
    /// - `RETRY_BASE_DELAY_MS` - First backoff in ms (default: 1000)
    /// - `RETRY_MULTIPLIER` - Backoff growth factor (default: 2.0)
    /// - `RETRY_MAX_DELAY_MS` - Backoff ceiling in ms (default: 60000)
    /// - `RETRY_JITTER` - Jitter ratio (default: 0.1)
    /// - `IMAGE_API_URL` - Image generation endpoint (default: OpenAI images API)
    /// - `IMAGE_API_KEY` - Bearer token for the image endpoint (default: unset)
    /// - `IMAGE_MODEL` - Image model name (default: dall-e-3)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            agent_cache_capacity: env_or("AGENT_CACHE_CAPACITY", defaults.agent_cache_capacity),
            user_cache_capacity: env_or("USER_CACHE_CAPACITY", defaults.user_cache_capacity),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            agent_seed_file: env::var("AGENT_SEED_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            retry_max_attempts: env_or("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts),
            retry_base_delay_ms: env_or("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms),
            retry_multiplier: env_or("RETRY_MULTIPLIER", defaults.retry_multiplier),
            retry_max_delay_ms: env_or("RETRY_MAX_DELAY_MS", defaults.retry_max_delay_ms),
            retry_jitter: env_or("RETRY_JITTER", defaults.retry_jitter),
            image_api_url: env::var("IMAGE_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.image_api_url),
            image_api_key: env::var("IMAGE_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            image_model: env::var("IMAGE_MODEL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.image_model),
        }
    }

    /// Backoff policy for image generation calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
        .with_multiplier(self.retry_multiplier)
        .with_max_delay(Duration::from_millis(self.retry_max_delay_ms))
        .with_jitter(self.retry_jitter)
    }

    /// Fails fast on values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.agent_cache_capacity == 0 || self.user_cache_capacity == 0 {
            return Err(AppError::InvalidConfig(
                "cache capacities must be at least 1".to_string(),
            ));
        }
        self.retry_policy().validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent_cache_capacity: DEFAULT_CACHE_CAPACITY,
            user_cache_capacity: DEFAULT_CACHE_CAPACITY,
            server_port: 3000,
            agent_seed_file: None,
            retry_max_attempts: 5,
            retry_base_delay_ms: 1000,
            retry_multiplier: 2.0,
            retry_max_delay_ms: 60_000,
            retry_jitter: 0.1,
            image_api_url: DEFAULT_IMAGE_API_URL.to_string(),
            image_api_key: None,
            image_model: "dall-e-3".to_string(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
