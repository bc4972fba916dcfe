//! Typed clinic endpoints.

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{
    Clinic, ClinicFilter, ClinicStats, DistrictClinics, NearbyClinics, SearchPage, SearchParams,
};

use super::{ApiError, Gateway};

/// Maximum concurrent requests for bulk detail fetches.
const MAX_CONCURRENT_REQUESTS: usize = 10;

/// Client for the clinic endpoints.
#[derive(Clone)]
pub struct ClinicApi {
    gateway: Gateway,
}

impl ClinicApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Fetch the clinic listing, optionally filtered.
    pub async fn list(&self, filter: &ClinicFilter) -> Result<Vec<Clinic>, ApiError> {
        let value: Value = self.gateway.get_with("/clinics/", filter).await?;
        clinic_list_from(value)
    }

    /// Fetch one clinic by id.
    pub async fn detail(&self, id: i64) -> Result<Clinic, ApiError> {
        self.gateway.get(&format!("/clinics/{}/", id)).await
    }

    /// Search clinics by text, district, and treatment, paginated.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchPage, ApiError> {
        self.gateway.get_with("/clinics/search/", params).await
    }

    /// Clinics within `radius_km` of a coordinate, sorted by distance.
    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
    ) -> Result<NearbyClinics, ApiError> {
        let query = serde_json::json!({"lat": lat, "lng": lng, "radius": radius_km});
        self.gateway.get_with("/clinics/nearby/", &query).await
    }

    /// Clinics in a district, optionally narrowed by free-form location text.
    pub async fn by_district(
        &self,
        district: &str,
        location: &str,
    ) -> Result<DistrictClinics, ApiError> {
        let query = serde_json::json!({"district": district, "location": location});
        self.gateway.get_with("/clinics/by-district/", &query).await
    }

    /// Districts that have at least one clinic.
    pub async fn districts(&self) -> Result<Vec<String>, ApiError> {
        #[derive(Deserialize)]
        struct Districts {
            districts: Vec<String>,
        }
        let response: Districts = self.gateway.get("/clinics/districts/").await?;
        Ok(response.districts)
    }

    /// Aggregate clinic statistics.
    pub async fn stats(&self) -> Result<ClinicStats, ApiError> {
        self.gateway.get("/clinics/stats/").await
    }

    /// Fetch details for many clinics with bounded concurrency.
    /// Individual failures are logged and skipped.
    pub async fn details_for(&self, ids: &[i64]) -> Vec<Clinic> {
        let fetches = stream::iter(ids.iter().copied())
            .map(|id| {
                let api = self.clone();
                async move { (id, api.detail(id).await) }
            })
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .collect::<Vec<_>>()
            .await;

        let mut clinics = Vec::with_capacity(fetches.len());
        for (id, result) in fetches {
            match result {
                Ok(clinic) => clinics.push(clinic),
                Err(err) => warn!(clinic_id = id, error = %err, "failed to fetch clinic detail"),
            }
        }
        clinics
    }
}

/// The listing endpoint returns either a plain array or a page wrapper,
/// depending on server pagination settings.
fn clinic_list_from(value: Value) -> Result<Vec<Clinic>, ApiError> {
    if let Ok(clinics) = serde_json::from_value::<Vec<Clinic>>(value.clone()) {
        return Ok(clinics);
    }

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default)]
        results: Vec<Clinic>,
    }

    let wrapper: Wrapper = serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse clinic listing: {}", e)))?;
    Ok(wrapper.results)
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

    fn api_with(server: &MockServer) -> ClinicApi {
        let config = Config {
            api_base_url: server.uri(),
            request_timeout_secs: 5,
            coalesce_refresh: false,
        };
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.store_pair("A1", "R1").unwrap();
        let session = SessionHandle::new(tokens);
        ClinicApi::new(Gateway::new(&config, session).unwrap())
    }

    fn clinic_json(id: i64, name: &str) -> Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "district": "강남구",
            "average_rating": "4.20",
            "total_reviews": 10
        })
    }

    #[tokio::test]
    async fn test_search_sends_query_params() {
        let server = MockServer::start().await;
        let api = api_with(&server);

        Mock::given(method("GET"))
            .and(path("/clinics/search/"))
            .and(query_param("q", "임플란트"))
            .and(query_param("district", "강남구"))
            .and(query_param("sort", "rating"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [clinic_json(1, "서울밝은치과")],
                "count": 1,
                "page": 1,
                "page_size": 20,
                "total_pages": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params = SearchParams {
            q: Some("임플란트".to_string()),
            district: Some("강남구".to_string()),
            sort: Some(crate::models::SortOrder::Rating),
            ..Default::default()
        };
        let page = api.search(&params).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "서울밝은치과");
        assert_eq!(page.results[0].average_rating, Some(4.2));
    }

    #[tokio::test]
    async fn test_list_accepts_array_and_wrapper_shapes() {
        let server = MockServer::start().await;
        let api = api_with(&server);

        Mock::given(method("GET"))
            .and(path("/clinics/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                clinic_json(1, "A"),
                clinic_json(2, "B")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let clinics = api.list(&ClinicFilter::default()).await.unwrap();
        assert_eq!(clinics.len(), 2);

        // Wrapper shape via the shared parser
        let wrapped = serde_json::json!({"count": 1, "results": [clinic_json(3, "C")]});
        let clinics = clinic_list_from(wrapped).unwrap();
        assert_eq!(clinics[0].id, 3);
    }

    #[tokio::test]
    async fn test_districts_unwraps_listing() {
        let server = MockServer::start().await;
        let api = api_with(&server);

        Mock::given(method("GET"))
            .and(path("/clinics/districts/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"districts": ["강남구", "서초구"], "count": 2}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let districts = api.districts().await.unwrap();
        assert_eq!(districts, vec!["강남구", "서초구"]);
    }

    #[tokio::test]
    async fn test_details_for_skips_failures() {
        let server = MockServer::start().await;
        let api = api_with(&server);

        Mock::given(method("GET"))
            .and(path("/clinics/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(clinic_json(1, "A")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/clinics/2/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
            .mount(&server)
            .await;

        let clinics = api.details_for(&[1, 2]).await;
        assert_eq!(clinics.len(), 1);
        assert_eq!(clinics[0].id, 1);
    }
}
