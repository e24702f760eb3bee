//! HTTP + WebSocket generation client.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use studia_core::prediction::PredictionStatus;
use studia_core::types::DbId;
use studia_replicate::Engine;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::messages::{ClientFrame, ServerFrame};

/// Errors surfaced by the generation client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server rejected the request.
    #[error("Server returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The server response did not contain the expected fields.
    #[error("Unexpected server response: {0}")]
    Payload(String),
}

/// Where to reach the server and how long to wait.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP base URL, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Bearer token for authenticated endpoints.
    pub access_token: String,
    /// Hard ceiling on the total wait for a result (default: 3 minutes).
    pub wait_timeout: Duration,
    /// Interval between polls when falling back (default: 5 seconds).
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Build a config with default wait behaviour.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            wait_timeout: Duration::from_secs(180),
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Derive the WebSocket URL from the HTTP base URL.
    pub fn ws_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{}", self.base_url)
        };
        format!("{ws_base}/api/v1/ws")
    }
}

/// Acknowledgement returned by a trigger endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredGeneration {
    pub prediction_id: String,
    pub status: PredictionStatus,
    pub engine: Engine,
}

/// How a bounded wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The image landed; the owning entity has been updated server-side.
    Succeeded { image_url: String },
    /// The generation failed (provider error or reaper timeout).
    Failed { error: Option<String> },
    /// Neither the realtime event nor polling produced a terminal state
    /// within the deadline. The prediction may still complete later.
    TimedOut,
}

/// Client wrapper around the generation endpoints.
pub struct GenerationClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GenerationClient {
    /// Create a client from a config.
    pub fn new(config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { http, config }
    }

    /// Trigger a course-cover generation.
    pub async fn trigger_course_cover(
        &self,
        course_id: DbId,
        engine: Engine,
        regenerate: bool,
    ) -> Result<TriggeredGeneration, ClientError> {
        let url = format!(
            "{}/api/v1/courses/{course_id}/generate-cover",
            self.config.base_url
        );
        self.trigger(&url, engine, regenerate).await
    }

    /// Trigger a module-image generation.
    pub async fn trigger_module_image(
        &self,
        module_id: DbId,
        engine: Engine,
    ) -> Result<TriggeredGeneration, ClientError> {
        let url = format!(
            "{}/api/v1/modules/{module_id}/generate-image",
            self.config.base_url
        );
        self.trigger(&url, engine, false).await
    }

    /// Trigger a generation and wait for its outcome with a bounded deadline.
    ///
    /// Listens on the WebSocket first; if the socket fails or stays silent,
    /// falls back to polling the prediction endpoint until the deadline.
    pub async fn generate_cover_and_wait(
        &self,
        course_id: DbId,
        engine: Engine,
        regenerate: bool,
    ) -> Result<WaitOutcome, ClientError> {
        let triggered = self.trigger_course_cover(course_id, engine, regenerate).await?;
        self.wait_for_result(course_id, &triggered.prediction_id).await
    }

    /// Wait for a prediction's outcome with a bounded deadline.
    pub async fn wait_for_result(
        &self,
        course_id: DbId,
        prediction_id: &str,
    ) -> Result<WaitOutcome, ClientError> {
        let deadline = Instant::now() + self.config.wait_timeout;

        // Realtime path. `None` means the socket was unusable or silent;
        // the store remains authoritative either way, so poll.
        if let Some(outcome) = self.listen_ws(course_id, prediction_id, deadline).await {
            return Ok(outcome);
        }

        tracing::debug!(prediction_id, "Realtime wait fell through, polling");
        self.poll_until(prediction_id, deadline).await
    }

    // -- internals ---------------------------------------------------------

    /// Shared trigger POST.
    async fn trigger(
        &self,
        url: &str,
        engine: Engine,
        regenerate: bool,
    ) -> Result<TriggeredGeneration, ClientError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({ "engine": engine, "regenerate": regenerate }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"].as_str().unwrap_or("unknown error").to_string();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await?;
        serde_json::from_value(body["data"].clone())
            .map_err(|e| ClientError::Payload(e.to_string()))
    }

    /// Listen on the WebSocket until a frame for `prediction_id` arrives or
    /// the deadline passes.
    ///
    /// Returns `None` when the socket cannot be used (connect failure,
    /// dropped mid-wait, or deadline reached with no matching frame) — the
    /// caller falls back to polling.
    async fn listen_ws(
        &self,
        course_id: DbId,
        prediction_id: &str,
        deadline: Instant,
    ) -> Option<WaitOutcome> {
        let ws_url = self.config.ws_url();

        let connect = tokio::time::timeout_at(deadline, connect_async(ws_url.as_str())).await;
        let (mut stream, _response) = match connect {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "WebSocket connect failed");
                return None;
            }
            Err(_) => return None,
        };

        let subscribe = ClientFrame::Subscribe { course_id };
        let frame = serde_json::to_string(&subscribe).expect("subscribe frame serializes");
        if stream.send(Message::Text(frame.into())).await.is_err() {
            return None;
        }

        loop {
            let next = match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(next) => next,
                // Deadline reached while the socket stayed silent.
                Err(_) => return None,
            };

            match next {
                Some(Ok(Message::Text(text))) => {
                    let frame: ServerFrame = match serde_json::from_str(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::debug!(error = %e, "Ignoring unknown frame");
                            continue;
                        }
                    };
                    if frame.prediction_id() != prediction_id {
                        continue;
                    }
                    return Some(match frame {
                        ServerFrame::CoverUpdated { image_url, .. }
                        | ServerFrame::ImageAdded { image_url, .. } => {
                            WaitOutcome::Succeeded { image_url }
                        }
                        ServerFrame::Failed { error, .. } => WaitOutcome::Failed { error },
                    });
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("WebSocket closed while waiting");
                    return None;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "WebSocket error while waiting");
                    return None;
                }
            }
        }
    }

    /// Poll the prediction endpoint until it is terminal or the deadline
    /// passes.
    async fn poll_until(
        &self,
        prediction_id: &str,
        deadline: Instant,
    ) -> Result<WaitOutcome, ClientError> {
        let url = format!(
            "{}/api/v1/predictions/{prediction_id}",
            self.config.base_url
        );

        loop {
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.config.access_token)
                .send()
                .await?;

            if response.status().is_success() {
                let body: serde_json::Value = response.json().await?;
                if let Some(outcome) = outcome_from_poll(&body["data"]) {
                    return Ok(outcome);
                }
            } else {
                tracing::debug!(status = %response.status(), "Poll returned non-success");
            }

            if Instant::now() + self.config.poll_interval >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// Map a polled prediction row to a terminal outcome, if it has one.
fn outcome_from_poll(data: &serde_json::Value) -> Option<WaitOutcome> {
    match data["status"].as_str()? {
        "succeeded" => Some(WaitOutcome::Succeeded {
            image_url: data["output"].as_str().unwrap_or_default().to_string(),
        }),
        "failed" => Some(WaitOutcome::Failed {
            error: data["error"].as_str().map(str::to_string),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_derivation() {
        let config = ClientConfig::new("http://localhost:3000", "t");
        assert_eq!(config.ws_url(), "ws://localhost:3000/api/v1/ws");

        let config = ClientConfig::new("https://studia.example/", "t");
        assert_eq!(config.ws_url(), "wss://studia.example/api/v1/ws");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = ClientConfig::new("http://localhost:3000/", "t");
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn poll_outcome_mapping() {
        let starting = serde_json::json!({"status": "starting"});
        assert_eq!(outcome_from_poll(&starting), None);

        let succeeded = serde_json::json!({"status": "succeeded", "output": "https://img/x.png"});
        assert_eq!(
            outcome_from_poll(&succeeded),
            Some(WaitOutcome::Succeeded {
                image_url: "https://img/x.png".to_string()
            })
        );

        let failed = serde_json::json!({"status": "failed", "error": "boom"});
        assert_eq!(
            outcome_from_poll(&failed),
            Some(WaitOutcome::Failed {
                error: Some("boom".to_string())
            })
        );

        let malformed = serde_json::json!({});
        assert_eq!(outcome_from_poll(&malformed), None);
    }
}
