use super::types::ChatCompletionResponse;
use crate::ai::{IdentificationRequest, VisionService};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Single-shot client for a chat completions endpoint.
///
/// Never retries on its own. Transport failures surface as
/// [`Error::Network`], bad statuses and envelopes as [`Error::Server`].
pub struct IdentificationClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl IdentificationClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: None,
            timeout,
        })
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            tracing::error!("Identification request timed out after {:?}", self.timeout);
            Error::Network(format!("request timed out after {:?}", self.timeout))
        } else {
            tracing::error!("Failed to reach identification endpoint: {}", e);
            Error::Network(e.to_string())
        }
    }
}

#[async_trait]
impl VisionService for IdentificationClient {
    async fn send(&self, request: IdentificationRequest) -> Result<String> {
        tracing::debug!(
            "Sending identification request to {} ({} image bytes)",
            self.endpoint,
            request.image_len()
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request.into_payload());
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            tracing::error!("Identification endpoint error (status {}): {}", status, body);
            return Err(Error::Server(format!("status {}: {}", status, body)));
        }

        let envelope: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse identification response: {}\nBody: {}", e, body);
            Error::Server(format!("malformed response envelope: {}", e))
        })?;

        let choice = envelope.choices.first().ok_or_else(|| {
            Error::Server("response has no choices[0].message.content".to_string())
        })?;
        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Identification answer was truncated by max_tokens");
        }

        choice
            .message
            .text()
            .ok_or_else(|| Error::Server("response has no choices[0].message.content".to_string()))
    }
}
