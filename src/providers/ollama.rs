use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::error;

use crate::errors::ProviderError;
use super::{Provider, RetryPolicy, status_error, transport_error, with_retry};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Retry and rate limit settings
    retry: RetryPolicy,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }
}

/// Parse a generate reply, accepting either one JSON object or a JSONL stream
pub fn parse_generation_response(response_text: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(response_text) {
        return Ok(response);
    }

    // Streaming replies are one JSON object per line, text split across them
    let chunks: Vec<GenerationResponse> = response_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<GenerationResponse>(line).ok())
        .collect();

    let Some(last) = chunks.last() else {
        let preview: String = response_text.chars().take(500).collect();
        error!("Failed to parse Ollama API response. Raw response (first 500 chars): {}", preview);
        return Err(ProviderError::ParseError("Ollama response contains invalid JSON".to_string()));
    };

    Ok(GenerationResponse {
        model: last.model.clone(),
        created_at: last.created_at.clone(),
        response: chunks.iter().map(|chunk| chunk.response.as_str()).collect(),
        done: true,
        prompt_eval_count: last.prompt_eval_count,
        eval_count: last.eval_count,
    })
}

impl Ollama {
    /// Create a new Ollama client with the default retry policy
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::new_with_config(base_url, RetryPolicy::default(), Duration::from_secs(120))
    }

    /// Create a new Ollama client with configuration
    ///
    /// `base_url` is the full server address, e.g. `http://localhost:11434`.
    /// Ollama speaks HTTP/1.1 only.
    pub fn new_with_config(base_url: impl Into<String>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let url = url.as_str();
        let client = &self.client;

        with_retry("Ollama", self.retry, move || async move {
            let response = client.post(url)
                .json(request)
                .send()
                .await
                .map_err(|e| transport_error("Ollama", e))?;

            if !response.status().is_success() {
                return Err(status_error("Ollama", response).await);
            }

            let response_text = response.text().await
                .map_err(|e| ProviderError::ParseError(format!("Failed to get response text from Ollama API: {}", e)))?;
            parse_generation_response(&response_text)
        }).await
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"].as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = GenerationRequest;
    type Response = GenerationResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.generate(&request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn extract_text(response: &Self::Response) -> String {
        response.response.clone()
    }
}
