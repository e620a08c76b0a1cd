//! Agent Memo - memoized agent metadata lookups
//!
//! Bounded LRU caching of agent and user records, plus exponential backoff
//! retries for calls to rate-limited upstream services.

pub mod agents;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod thumbnails;

pub use api::AppState;
pub use config::Config;
