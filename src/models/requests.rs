//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Maximum accepted summary length in bytes
pub const MAX_SUMMARY_LENGTH: usize = 16 * 1024;

/// Maximum accepted world description length in bytes
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;

/// Request body for PUT /users/:id/summary
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryUpdateRequest {
    /// Replacement summary text
    pub summary: String,
}

impl SummaryUpdateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.summary.trim().is_empty() {
            return Some("Summary cannot be empty".to_string());
        }
        if self.summary.len() > MAX_SUMMARY_LENGTH {
            return Some(format!(
                "Summary exceeds maximum length of {} bytes",
                MAX_SUMMARY_LENGTH
            ));
        }
        None
    }
}

/// Request body for POST /thumbnails
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailRequest {
    #[serde(alias = "worldID")]
    pub world_id: String,
    /// Free-text world description the image is drawn from
    pub description: String,
}

impl ThumbnailRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.world_id.trim().is_empty() {
            return Some("World id cannot be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Some("Description cannot be empty".to_string());
        }
        if self.description.len() > MAX_DESCRIPTION_LENGTH {
            return Some(format!(
                "Description exceeds maximum length of {} bytes",
                MAX_DESCRIPTION_LENGTH
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_request_deserialize() {
        let req: SummaryUpdateRequest =
            serde_json::from_str(r#"{"summary": "likes fishing"}"#).unwrap();
        assert_eq!(req.summary, "likes fishing");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_blank_summary() {
        let req = SummaryUpdateRequest {
            summary: "  ".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_oversized_summary() {
        let req = SummaryUpdateRequest {
            summary: "x".repeat(MAX_SUMMARY_LENGTH + 1),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_thumbnail_request_accepts_legacy_field_name() {
        let req: ThumbnailRequest =
            serde_json::from_str(r#"{"worldID": "w-9", "description": "ice caves"}"#).unwrap();
        assert_eq!(req.world_id, "w-9");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_thumbnail_request() {
        let blank_id = ThumbnailRequest {
            world_id: " ".to_string(),
            description: "ice caves".to_string(),
        };
        let long_description = ThumbnailRequest {
            world_id: "w-9".to_string(),
            description: "x".repeat(MAX_DESCRIPTION_LENGTH + 1),
        };
        assert!(blank_id.validate().is_some());
        assert!(long_description.validate().is_some());
    }
}
