//! Typed price comparison endpoints.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{PriceComparison, PriceFilter, RegionalStats, TreatmentType};

use super::{ApiError, Gateway};

/// Client for the price comparison endpoints.
#[derive(Clone)]
pub struct PriceApi {
    gateway: Gateway,
}

impl PriceApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Verified prices for one district and treatment type, cheapest first.
    pub async fn comparison(
        &self,
        district: &str,
        treatment_type: &str,
    ) -> Result<PriceComparison, ApiError> {
        let query = serde_json::json!({
            "district": district,
            "treatment_type": treatment_type,
        });
        self.gateway.get_with("/price-comparison/", &query).await
    }

    /// Precomputed per-district price statistics.
    pub async fn regional_stats(&self, filter: &PriceFilter) -> Result<RegionalStats, ApiError> {
        self.gateway.get_with("/price-stats/", filter).await
    }

    /// Treatment types present in the price data, with display labels.
    pub async fn treatment_types(&self) -> Result<Vec<TreatmentType>, ApiError> {
        let value: Value = self.gateway.get("/treatment-types/").await?;
        if let Ok(types) = serde_json::from_value::<Vec<TreatmentType>>(value.clone()) {
            return Ok(types);
        }

        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default)]
            treatments: Vec<TreatmentType>,
        }
        let wrapper: Wrapper = serde_json::from_value(value).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse treatment types: {}", e))
        })?;
        Ok(wrapper.treatments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::SessionHandle;
    use crate::auth::tokens::{MemoryTokenStore, TokenStore};
    use crate::config::Config;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_with(server: &MockServer) -> PriceApi {
        let config = Config {
            api_base_url: server.uri(),
            request_timeout_secs: 5,
            coalesce_refresh: false,
        };
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.store_pair("A1", "R1").unwrap();
        let session = SessionHandle::new(tokens);
        PriceApi::new(Gateway::new(&config, session).unwrap())
    }

    #[tokio::test]
    async fn test_comparison_sends_both_filters() {
        let server = MockServer::start().await;
        let api = api_with(&server);

        Mock::given(method("GET"))
            .and(path("/price-comparison/"))
            .and(query_param("district", "강남구"))
            .and(query_param("treatment_type", "implant"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "prices": [{
                    "clinic_id": 3,
                    "clinic_name": "화이트치과",
                    "price": 1200000,
                    "address": "서울 강남구",
                    "average_rating": 4.1,
                    "total_reviews": 33
                }],
                "stats": {
                    "min_price": 1200000,
                    "max_price": 1200000,
                    "avg_price": 1200000.0,
                    "sample_count": 1
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let comparison = api.comparison("강남구", "implant").await.unwrap();
        assert_eq!(comparison.prices[0].price, 1_200_000);
        assert_eq!(comparison.stats.unwrap().sample_count, 1);
    }

    #[tokio::test]
    async fn test_treatment_types_accepts_wrapper_shape() {
        let server = MockServer::start().await;
        let api = api_with(&server);

        Mock::given(method("GET"))
            .and(path("/treatment-types/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "treatments": [
                    {"value": "implant", "label": "임플란트", "count": 120},
                    {"value": "scaling", "label": "스케일링", "count": 340}
                ],
                "count": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let types = api.treatment_types().await.unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].value, "implant");
        assert_eq!(types[1].label, "스케일링");
    }
}
