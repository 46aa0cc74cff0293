//! Remote chat-completions transport
//!
//! One provider, one HTTP call. Failures come back pre-classified so
//! the fallback loop in [`client`](super::client) can own retry policy
//! while providers stay pure configuration data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// One remote model endpoint in the fallback priority list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Display name used in logs
    pub name: String,
    /// OpenAI-compatible API base, e.g. "https://openrouter.ai/api/v1"
    pub base_url: String,
    /// Model identifier sent in the request body
    pub model: String,
}

/// Classified transport failure
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Credential rejected or billing problem
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The provider refused the request shape or model id
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Provider-pool quota exhausted (distinct from a transient rate limit)
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transient rate limit; worth a backoff before moving on
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Timeout, connection failure, or an unparseable response
    #[error("transport failure: {0}")]
    Other(String),
}

/// Seam between the enrichment client and the network.
/// Returns the raw completion content on success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(
        &self,
        provider: &ProviderSpec,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, TransportError>;
}

/// Request timeout; expiry classifies as a generic transport failure
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sampling temperature for enrichment requests
const TEMPERATURE: f64 = 0.3;

/// reqwest-backed production transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn complete(
        &self,
        provider: &ProviderSpec,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, TransportError> {
        let request = json!({
            "model": provider.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", provider.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Other("request timed out".to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::Other(format!("invalid response body: {e}")))?;

        raw.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|content| content.as_str())
            .map(str::to_string)
            .ok_or_else(|| TransportError::Other("response carried no content".to_string()))
    }
}

/// Map an HTTP error status to a failure class
fn classify_status(status: u16, body: &str) -> TransportError {
    let summary = truncate(body, 200);
    match status {
        401 | 402 | 403 => TransportError::Auth(format!("{status}: {summary}")),
        400 | 404 => TransportError::BadRequest(format!("{status}: {summary}")),
        429 => {
            if body.to_lowercase().contains("quota") {
                TransportError::QuotaExceeded(summary)
            } else {
                TransportError::RateLimited(summary)
            }
        }
        _ => TransportError::Other(format!("{status}: {summary}")),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}…", &text[..cut])
    }
}
