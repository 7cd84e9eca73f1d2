pub mod current;
pub mod types;

use reqwest::Response;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::types::ErrorResponse;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {detail}")]
    ApiError { status: u16, detail: String },
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

const BASE_URL: &str = "http://api.weatherapi.com/v1";

pub struct WeatherApiClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Issue a GET request with the API key appended as a query parameter.
    pub(crate) async fn keyed_get<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ApiClientError> {
        let resp = self
            .http_client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "json")
            .send()
            .await?;

        self.handle_response(resp).await
    }

    /// Check status (decoding the provider error envelope when possible) and
    /// deserialize the body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, ApiClientError> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => body,
            };
            return Err(ApiClientError::ApiError {
                status: status.as_u16(),
                detail,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str::<T>(&body)
            .map_err(|e| ApiClientError::Deserialize(format!("{e}: {body}")))
    }

    /// Build a full API URL from a path (e.g. "/current.json?q=Zagreb").
    pub(crate) fn url(path: &str) -> String {
        format!("{BASE_URL}{path}")
    }
}
