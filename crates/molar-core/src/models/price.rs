//! Price comparison domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One clinic's verified price for a treatment.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuote {
    pub clinic_id: i64,
    pub clinic_name: String,
    pub price: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub night_service: bool,
    #[serde(default)]
    pub weekend_service: bool,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: i64,
}

/// Aggregate statistics over the quotes in a comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceStats {
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: f64,
    pub sample_count: i64,
}

/// Price comparison for one district and treatment type.
/// `stats` is absent when no price data matched.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceComparison {
    pub prices: Vec<PriceQuote>,
    #[serde(default)]
    pub stats: Option<PriceStats>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Filter for the regional price statistics endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_type: Option<String>,
}

/// Precomputed per-district price statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionalPriceStat {
    pub district: String,
    pub treatment_type: String,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: f64,
    #[serde(default)]
    pub median_price: i64,
    pub sample_count: i64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionalStats {
    pub stats: Vec<RegionalPriceStat>,
    pub count: i64,
}

/// A treatment type with its display label and sample count.
#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentType {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comparison_without_data() {
        let json = r#"{"prices": [], "stats": null, "message": "해당 조건의 가격 데이터가 없습니다."}"#;
        let comparison: PriceComparison =
            serde_json::from_str(json).expect("Failed to parse comparison");
        assert!(comparison.prices.is_empty());
        assert!(comparison.stats.is_none());
        assert!(comparison.message.is_some());
    }

    #[test]
    fn test_parse_comparison_with_stats() {
        let json = r#"{
            "prices": [{"clinic_id": 3, "clinic_name": "화이트치과", "price": 50000,
                        "address": "서울 서초구", "average_rating": 4.1, "total_reviews": 33}],
            "stats": {"min_price": 50000, "max_price": 50000, "avg_price": 50000.0, "sample_count": 1}
        }"#;
        let comparison: PriceComparison =
            serde_json::from_str(json).expect("Failed to parse comparison");
        assert_eq!(comparison.prices.len(), 1);
        assert_eq!(comparison.stats.expect("stats present").sample_count, 1);
    }
}
