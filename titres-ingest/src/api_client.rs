//! Read-side client for the titles backend
//!
//! Explicitly constructed and passed to whoever needs it; lifecycle is
//! owned by the composition root, never ambient global state. Title
//! records are fetched, rendered, and discarded; this client owns none
//! of them.

use crate::error::TransportError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use titres_common::api::{TitreQuery, TitreStatistics, TitreSummary};
use tracing::debug;
use uuid::Uuid;

/// Default timeout for read requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the title-management read endpoints
#[derive(Debug, Clone)]
pub struct TitleApiClient {
    http_client: Client,
    base_url: String,
}

impl TitleApiClient {
    /// Create a client against the backend base URL
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with the default timeout
    pub fn with_default_timeout(base_url: &str) -> Self {
        Self::new(base_url, DEFAULT_TIMEOUT)
    }

    /// Backend base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        debug!(url = %url, "Fetching");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                message: if body.is_empty() {
                    format!("Request failed with status {}", status.as_u16())
                } else {
                    body
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Network(format!("Response parse failed: {}", e)))
    }

    /// `GET /titres/` with optional search/type/status/urgency filters
    pub async fn list_titres(
        &self,
        query: &TitreQuery,
    ) -> Result<Vec<TitreSummary>, TransportError> {
        self.get_json(format!("{}/titres/", self.base_url), &query.to_pairs())
            .await
    }

    /// `GET /titres/{id}/`
    pub async fn get_titre(&self, id: Uuid) -> Result<TitreSummary, TransportError> {
        self.get_json(format!("{}/titres/{}/", self.base_url, id), &[])
            .await
    }

    /// `GET /titres/statistics/` dashboard aggregates
    pub async fn statistics(&self) -> Result<TitreStatistics, TransportError> {
        self.get_json(format!("{}/titres/statistics/", self.base_url), &[])
            .await
    }

    /// `GET /titres/expiring_soon/?days=N`
    pub async fn expiring_soon(
        &self,
        days: u32,
    ) -> Result<Vec<TitreSummary>, TransportError> {
        self.get_json(
            format!("{}/titres/expiring_soon/", self.base_url),
            &[("days", days.to_string())],
        )
        .await
    }
}
