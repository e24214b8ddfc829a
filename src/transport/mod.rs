//! Upstream transport.
//!
//! The governance core depends only on "send a tagged payload, get a JSON
//! body back or an error". [`HttpTransport`] implements that over a single
//! POST endpoint; tests substitute their own [`Transport`].

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::types::UpstreamRequest;

pub use http::{DEFAULT_TIMEOUT, HttpTransport};

/// Sends one request to the upstream text-processing API.
///
/// Implementations return `Err` for any non-2xx response. Errors for which
/// [`HermodError::is_transient()`](crate::HermodError::is_transient) holds
/// are retried by the queue.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging/debugging.
    fn name(&self) -> &str;

    async fn request(&self, payload: &UpstreamRequest) -> Result<Value>;
}
