//! Typeform HTTP transport.
//!
//! The stream code only sees [`ApiSource`]: a logical GET that yields decoded
//! JSON. Authentication, timeouts and retry policy stay in [`TypeformClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::config::TapConfig;
use crate::error::TapError;

// ============================================================================
// ApiSource trait
// ============================================================================

/// Source of decoded JSON pages.
#[async_trait]
pub trait ApiSource: Send + Sync {
    /// Issue a GET for `path` (relative to the API root) with `query` parameters.
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, TapError>;
}

// ============================================================================
// Typeform error body (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TypeformErrorBody {
    description: Option<String>,
}

// ============================================================================
// TypeformClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeformClient {
    client: Client,
    base_url: String,
    token: String,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl TypeformClient {
    pub fn new(config: &TapConfig) -> Result<Self, TapError> {
        if config.personal_access_token.trim().is_empty() {
            return Err(TapError::MissingToken);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.personal_access_token.clone(),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    async fn get_once(&self, path: &str, query: &[(String, String)]) -> Result<Value, TapError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TypeformErrorBody>(&body)
                .ok()
                .and_then(|e| e.description)
                .unwrap_or(body);

            return Err(TapError::Api {
                status: status.as_u16(),
                path: path.to_string(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Delays between attempts: `retry_delay_ms`, then doubling, capped at 30s.
///
/// `ExponentialBackoff::from_millis(n)` alone would wait `n^k` ms, so the base
/// stays at 2 and the configured delay goes into the factor.
fn backoff(retry_delay_ms: u64, max_retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor((retry_delay_ms / 2).max(1))
        .max_delay(Duration::from_secs(30))
        .take(max_retries)
}

#[async_trait]
impl ApiSource for TypeformClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, TapError> {
        let retry_strategy = backoff(self.retry_delay_ms, self.max_retries).map(jitter);

        let result = RetryIf::spawn(
            retry_strategy,
            || self.get_once(path, query),
            |e: &TapError| {
                let transient = e.is_transient();
                if transient {
                    tracing::warn!(path = %path, error = %e, "Transient Typeform error, retrying");
                }
                transient
            },
        )
        .await;

        if let Err(e) = &result {
            tracing::error!(path = %path, error = %e, "Typeform request failed");
        }

        result
    }
}

// ============================================================================
// TESTS
// ============================================================================
