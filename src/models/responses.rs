//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use base64::Engine;
use serde::Serialize;

use crate::agents::{AgentCacheStats, AgentInfo, AgentKind};
use crate::cache::CacheStats;
use crate::thumbnails::Thumbnail;

/// Response body for GET /agents/:id and GET /users/:id
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfoResponse {
    pub id: String,
    pub kind: AgentKind,
    pub username: String,
    pub summary: String,
}

impl AgentInfoResponse {
    pub fn new(id: impl Into<String>, kind: AgentKind, info: AgentInfo) -> Self {
        Self {
            id: id.into(),
            kind,
            username: info.username,
            summary: info.summary,
        }
    }
}

/// Response body for PUT /users/:id/summary
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub id: String,
    /// Whether a cached entry was refreshed
    pub refreshed: bool,
}

/// Response body for DELETE /agents/:id/cache and DELETE /users/:id/cache
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub id: String,
    pub kind: AgentKind,
    /// Whether an entry was dropped
    pub removed: bool,
}

/// Response body for POST /thumbnails
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailResponse {
    pub world_id: String,
    /// Storage key the image should be uploaded under
    pub object_key: String,
    pub size_bytes: usize,
    /// Base64-encoded image
    pub image: String,
}

impl ThumbnailResponse {
    pub fn new(world_id: impl Into<String>, thumbnail: Thumbnail) -> Self {
        Self {
            world_id: world_id.into(),
            object_key: thumbnail.object_key,
            size_bytes: thumbnail.image.len(),
            image: base64::engine::general_purpose::STANDARD.encode(&thumbnail.image),
        }
    }
}

/// Per-cache counters with the derived hit rate
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsBody {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub agents: CacheStatsBody,
    pub users: CacheStatsBody,
}

impl From<AgentCacheStats> for StatsResponse {
    fn from(stats: AgentCacheStats) -> Self {
        Self {
            agents: stats.agents.into(),
            users: stats.users.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_info_response_serialize() {
        let resp = AgentInfoResponse::new("u1", AgentKind::User, AgentInfo::new("sam", "player"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["username"], "sam");
        assert_eq!(json["summary"], "player");
    }

    #[test]
    fn test_thumbnail_response_encodes_image() {
        let thumbnail = Thumbnail {
            object_key: "thumbnails/w-1.jpeg".to_string(),
            image: vec![0xFF, 0xD8, 0xFF],
        };
        let json = serde_json::to_value(ThumbnailResponse::new("w-1", thumbnail)).unwrap();
        assert_eq!(json["object_key"], "thumbnails/w-1.jpeg");
        assert_eq!(json["size_bytes"], 3);
        assert_eq!(json["image"], "/9j/");
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let agents = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            total_entries: 100,
        };
        let resp = StatsResponse::from(AgentCacheStats {
            agents,
            users: CacheStats::default(),
        });
        assert!((resp.agents.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.users.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
