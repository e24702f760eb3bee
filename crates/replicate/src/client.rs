//! Replicate API client: enqueue predictions, nothing more.
//!
//! `create_prediction` asks the provider to *start* a generation and
//! returns the provider-assigned id immediately; completion arrives later
//! on the webhook. Transient transport failures are retried with the shared
//! bounded-backoff helper; API rejections (4xx) are not.

use std::time::Duration;

use serde::Deserialize;
use studia_core::retry::{self, RetryConfig};

use crate::engine::Engine;

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default API base URL. Overridable for tests and proxies.
const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Replicate API failures.
#[derive(Debug, thiserror::Error)]
pub enum ReplicateError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("Replicate returned HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The API response did not contain the expected fields.
    #[error("Unexpected Replicate response: {0}")]
    Payload(String),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The provider's acknowledgement of an enqueued prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPrediction {
    /// Provider-assigned prediction id.
    pub id: String,
    /// Initial status as reported by the provider (normally `starting`).
    pub status: String,
}

/// Client for the Replicate predictions API.
pub struct ReplicateClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    webhook_url: String,
    retry: RetryConfig,
}

impl ReplicateClient {
    /// Create a client with the default API base URL.
    ///
    /// `webhook_url` is the publicly reachable address of our webhook
    /// receiver; it is attached to every enqueued prediction.
    pub fn new(api_token: String, webhook_url: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_token, webhook_url)
    }

    /// Create a client against a specific base URL (tests, proxies).
    pub fn with_base_url(base_url: String, api_token: String, webhook_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            webhook_url,
            retry: RetryConfig::default(),
        }
    }

    /// Enqueue a generation with the given engine and prompt.
    ///
    /// Returns as soon as the provider acknowledges the job; the result
    /// arrives later on the webhook. Transient failures are retried up to
    /// the configured attempt budget, then surfaced.
    pub async fn create_prediction(
        &self,
        engine: Engine,
        input: &serde_json::Value,
    ) -> Result<CreatedPrediction, ReplicateError> {
        let url = format!("{}/v1/models/{}/predictions", self.base_url, engine.model());
        let body = serde_json::json!({
            "input": input,
            "webhook": self.webhook_url,
            "webhook_events_filter": ["completed"],
        });

        let created = retry::with_backoff(&self.retry, "Replicate enqueue", || {
            self.try_create(&url, &body)
        })
        .await?;

        tracing::info!(
            prediction_id = %created.id,
            engine = %engine,
            "Replicate prediction enqueued"
        );
        Ok(created)
    }

    /// Execute a single enqueue POST and parse the acknowledgement.
    async fn try_create(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<CreatedPrediction, ReplicateError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ReplicateError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let created: CreatedPrediction = response
            .json()
            .await
            .map_err(|e| ReplicateError::Payload(e.to_string()))?;

        if created.id.is_empty() {
            return Err(ReplicateError::Payload(
                "prediction id missing from response".into(),
            ));
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ReplicateClient::with_base_url(
            "http://localhost:9999/".into(),
            "r8_test".into(),
            "http://localhost/webhook".into(),
        );
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn error_display_includes_status() {
        let err = ReplicateError::Api {
            status: 422,
            detail: "invalid version".into(),
        };
        assert!(err.to_string().contains("422"));
    }
}
