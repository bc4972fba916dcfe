//! Review domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single crawled review with its processing flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default)]
    pub is_flagged: bool,
    /// Truncated reviewer hash, or "anonymous".
    #[serde(default)]
    pub reviewer_hash: String,
}

/// Query parameters for a clinic's review listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewQuery {
    /// Review source filter: "naver", "google", or absent for all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// One page of reviews for a clinic.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub total_count: i64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub clinic_name: String,
}

/// Aggregate review statistics for a clinic.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewStatistics {
    pub total_reviews: i64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub naver_reviews: i64,
    #[serde(default)]
    pub google_reviews: i64,
    /// Reviews created in the last 30 days.
    #[serde(default)]
    pub recent_reviews: i64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_review_page() {
        let json = r#"{
            "reviews": [{
                "id": 7,
                "source": "naver",
                "text": "친절하고 과잉진료가 없어요",
                "rating": 5.0,
                "review_date": "2025-03-02T10:00:00+09:00",
                "created_at": "2025-03-02T01:00:00Z",
                "is_processed": true,
                "is_duplicate": false,
                "is_flagged": false,
                "reviewer_hash": "a1b2c3d4"
            }],
            "total_count": 1,
            "page": 1,
            "page_size": 20,
            "has_next": false,
            "clinic_name": "서울밝은치과"
        }"#;

        let page: ReviewPage = serde_json::from_str(json).expect("Failed to parse review page");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.reviews[0].source, "naver");
        assert!(page.reviews[0].is_processed);
        assert!(!page.has_next);
    }
}
