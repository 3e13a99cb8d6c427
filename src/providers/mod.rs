/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 */

use async_trait::async_trait;
use log::error;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

/// Retry settings shared by the HTTP clients
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first one
    pub max_retries: u32,
    /// Base backoff time in milliseconds, doubled on every retry
    pub backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    pub rate_limit: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.backoff_base_ms.saturating_mul(1u64 << (attempt.saturating_sub(1)).min(16));
        let spacing_ms = self.rate_limit
            .filter(|rpm| *rpm > 0)
            .map(|rpm| 60_000 / rpm as u64)
            .unwrap_or(0);
        Duration::from_millis(backoff_ms.max(spacing_ms))
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy runs out of attempts
pub async fn with_retry<T, F, Fut>(provider_name: &str, policy: RetryPolicy, mut operation: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                error!("{} request failed: {} - attempt {}/{}", provider_name, e, attempt, policy.max_retries + 1);
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Map a transport error from reqwest to a provider error
pub(crate) fn transport_error(provider_name: &str, error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", provider_name, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider_name, error))
    }
}

/// Turn a non-success HTTP response into a provider error
pub(crate) async fn status_error(provider_name: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let error_text = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", provider_name, status, error_text);
    ProviderError::from_status(status.as_u16(), error_text)
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
