//! Authenticated request gateway.
//!
//! Every outbound call picks up the current access token as a bearer
//! header. A 401 response triggers at most one token refresh followed by
//! one replay of the original request; a second 401 is surfaced to the
//! caller. When the refresh itself fails the whole session is cleared and
//! the original authorization error is returned. All other failure
//! classes pass through as typed errors without retries or token
//! mutation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::session::SessionHandle;
use crate::config::Config;

use super::ApiError;

/// Token refresh endpoint. Called bare, never routed through the
/// authenticated path.
const REFRESH_PATH: &str = "/auth/token/refresh/";

/// Marker for the single refresh-retry cycle of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retried,
}

#[derive(serde::Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Gateway for authenticated API calls.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    session: SessionHandle,
    refresh_gate: Arc<Mutex<()>>,
    coalesce_refresh: bool,
}

impl Gateway {
    pub fn new(config: &Config, session: SessionHandle) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            refresh_gate: Arc::new(Mutex::new(())),
            coalesce_refresh: config.coalesce_refresh,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None, None).await
    }

    pub async fn get_with<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let query = encode(query)?;
        self.execute(Method::GET, path, Some(query), None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.execute(Method::POST, path, None, Some(body)).await
    }

    /// POST where the response body is empty or an acknowledgement.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let body = encode(body)?;
        self.execute_raw(Method::POST, path, None, Some(body))
            .await?;
        Ok(())
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.execute(Method::PATCH, path, None, Some(body)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<Value>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.execute_raw(method, path, query, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        query: Option<Value>,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut attempt = Attempt::Initial;

        loop {
            // Storage is the source of truth, read at send time
            let sent_token = self.session.access_token();

            let mut request = self.client.request(method.clone(), self.url(path));
            if let Some(ref query) = query {
                request = request.query(query);
            }
            if let Some(ref body) = body {
                request = request.json(body);
            }
            if let Some(ref token) = sent_token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                if attempt == Attempt::Retried {
                    debug!(path, "401 after refreshed retry, giving up");
                    return Err(ApiError::Unauthorized);
                }
                attempt = Attempt::Retried;

                if self.recover_authorization(sent_token.as_deref()).await {
                    debug!(path, "retrying request with refreshed access token");
                    continue;
                }
                return Err(ApiError::Unauthorized);
            }

            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                return Err(ApiError::from_status(status, &body_text));
            }

            return Ok(response);
        }
    }

    /// Attempt to recover from a 401 by refreshing the access token.
    /// Returns true when a fresh token is in place and the original
    /// request should be replayed. On refresh failure the session is
    /// cleared (forced logout).
    async fn recover_authorization(&self, sent_token: Option<&str>) -> bool {
        let Some(refresh_token) = self.session.refresh_token() else {
            debug!("401 with no refresh token, nothing to recover");
            return false;
        };

        // With coalescing enabled, concurrent 401s funnel through one
        // in-flight refresh; waiters re-check the stored token and skip
        // their own refresh when it already changed.
        let _gate = if self.coalesce_refresh {
            let gate = self.refresh_gate.lock().await;
            if self.session.access_token().as_deref() != sent_token {
                return true;
            }
            Some(gate)
        } else {
            None
        };

        match self.refresh_access(&refresh_token).await {
            Ok(access) => {
                self.session.persist_access(&access);
                true
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.session.clear();
                false
            }
        }
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e)))?;
        Ok(parsed.access)
    }
}

fn encode<V: Serialize>(value: &V) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request: {}", e)))
}
