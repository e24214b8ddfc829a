//! HTTP transport posting tagged JSON payloads to one endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::types::UpstreamRequest;
use crate::{HermodError, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body excerpt kept in [`HermodError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// Posts every payload as JSON to a single endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HermodError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(endpoint, http))
    }

    /// Reuse an existing reqwest client.
    pub fn with_http_client(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn request(&self, payload: &UpstreamRequest) -> Result<Value> {
        debug!(endpoint = %self.endpoint, r#type = payload.tag(), "posting upstream request");
        let response = self
            .http
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| HermodError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            return Err(HermodError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HermodError::Http(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
