//! Clinic domain types and search parameters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A dental clinic as returned by the listing and detail endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Clinic {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: i64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub night_service: bool,
    #[serde(default)]
    pub weekend_service: bool,
    /// Sentiment-derived aspect scores on a 1-5 scale.
    #[serde(default)]
    pub aspect_scores: Option<AspectScores>,
    #[serde(default)]
    pub comprehensive_score: Option<f64>,
    /// Per-treatment price summary keyed by treatment type.
    #[serde(default)]
    pub price_info: HashMap<String, TreatmentPrice>,
    /// Distance in km from the search center. Only present in nearby results.
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Review-sentiment aspect scores, one per analysis dimension.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AspectScores {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub skill: Option<f64>,
    #[serde(default)]
    pub kindness: Option<f64>,
    #[serde(default)]
    pub waiting: Option<f64>,
    #[serde(default)]
    pub facility: Option<f64>,
    #[serde(default)]
    pub overtreatment: Option<f64>,
}

/// Summary price entry for one treatment type.
#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentPrice {
    pub average_price: i64,
    #[serde(default)]
    pub price_count: i64,
    #[serde(default)]
    pub currency: String,
}

/// Filter for the plain clinic listing endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClinicFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_reviews: Option<u32>,
}

/// Search result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Recommended,
    Rating,
    Reviews,
    Name,
}

/// Query parameters for the clinic search endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    pub results: Vec<Clinic>,
    pub count: i64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// Clinics within a radius of a coordinate, sorted by distance.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyClinics {
    pub results: Vec<Clinic>,
    pub count: i64,
    #[serde(default)]
    pub center: Option<GeoPoint>,
    #[serde(default)]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Clinics filtered by district and free-form location text.
#[derive(Debug, Clone, Deserialize)]
pub struct DistrictClinics {
    pub results: Vec<Clinic>,
    pub count: i64,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub location: String,
}

/// Aggregate clinic statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicStats {
    pub total_clinics: i64,
    pub verified_clinics: i64,
    #[serde(default)]
    pub verification_rate: f64,
    #[serde(default)]
    pub district_stats: Vec<DistrictStat>,
    #[serde(default)]
    pub rating_distribution: HashMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistrictStat {
    pub district: String,
    pub count: i64,
    #[serde(default)]
    pub avg_rating: Option<f64>,
}

/// Accept decimals serialized either as JSON numbers or as strings.
pub(crate) fn decimal_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clinic_with_string_decimals() {
        let json = r#"{
            "id": 42,
            "name": "서울밝은치과",
            "address": "서울 강남구 테헤란로 1",
            "district": "강남구",
            "latitude": "37.498095",
            "longitude": "127.027610",
            "average_rating": "4.35",
            "total_reviews": 120,
            "is_verified": true,
            "has_parking": true,
            "night_service": false,
            "weekend_service": true,
            "aspect_scores": {"price": 3.5, "skill": 4.2},
            "comprehensive_score": 3.9,
            "price_info": {"implant": {"average_price": 1200000, "price_count": 8, "currency": "KRW"}}
        }"#;

        let clinic: Clinic = serde_json::from_str(json).expect("Failed to parse clinic");
        assert_eq!(clinic.latitude, Some(37.498095));
        assert_eq!(clinic.average_rating, Some(4.35));
        assert_eq!(clinic.price_info["implant"].average_price, 1_200_000);
        let aspects = clinic.aspect_scores.expect("aspect scores present");
        assert_eq!(aspects.skill, Some(4.2));
        assert_eq!(aspects.waiting, None);
    }

    #[test]
    fn test_parse_clinic_with_numeric_decimals() {
        let json = r#"{"id": 1, "name": "A", "latitude": 37.5, "average_rating": null}"#;
        let clinic: Clinic = serde_json::from_str(json).expect("Failed to parse clinic");
        assert_eq!(clinic.latitude, Some(37.5));
        assert_eq!(clinic.average_rating, None);
    }

    #[test]
    fn test_search_params_query_encoding() {
        let params = SearchParams {
            q: Some("임플란트".to_string()),
            sort: Some(SortOrder::Rating),
            page: Some(2),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).expect("Failed to serialize params");
        assert_eq!(
            value,
            serde_json::json!({"q": "임플란트", "sort": "rating", "page": 2})
        );
    }
}
