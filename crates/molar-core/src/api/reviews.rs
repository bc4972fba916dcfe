//! Typed review endpoints.

use crate::models::{ReviewPage, ReviewQuery, ReviewStatistics};

use super::{ApiError, Gateway};

/// Client for the review endpoints.
#[derive(Clone)]
pub struct ReviewApi {
    gateway: Gateway,
}

impl ReviewApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// One page of a clinic's reviews, newest first.
    pub async fn clinic_reviews(
        &self,
        clinic_id: i64,
        query: &ReviewQuery,
    ) -> Result<ReviewPage, ApiError> {
        self.gateway
            .get_with(&format!("/reviews/clinic/{}/", clinic_id), query)
            .await
    }

    /// Aggregate statistics over a clinic's processed reviews.
    pub async fn statistics(&self, clinic_id: i64) -> Result<ReviewStatistics, ApiError> {
        self.gateway
            .get(&format!("/reviews/statistics/{}/", clinic_id))
            .await
    }
}
