//! Cache Module
//!
//! Bounded in-memory caching with LRU eviction.

mod lru;
mod shared;
mod stats;


// Re-export public types
pub use lru::LruCache;
pub use shared::SharedLruCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Default capacity of the agent and user metadata caches
pub const DEFAULT_CACHE_CAPACITY: usize = 128;
