use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use super::{Provider, RetryPolicy, status_error, transport_error, with_retry};

/// OpenAI-compatible chat completions client (OpenAI, LM Studio)
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, e.g. https://api.openai.com/v1
    endpoint: String,
    /// Retry and rate limit settings
    retry: RetryPolicy,
    /// Model used by `test_connection`
    probe_model: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u32,
    /// Number of completion tokens
    pub completion_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens to generate
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI-compatible client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, RetryPolicy::default(), Duration::from_secs(60))
    }

    /// Create a new client with retry policy and request timeout
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            retry,
            probe_model: "gpt-3.5-turbo".to_string(),
        }
    }

    /// Model used when probing the connection
    pub fn with_probe_model(mut self, model: impl Into<String>) -> Self {
        self.probe_model = model.into();
        self
    }

    fn completions_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let url = self.completions_url();
        let url = url.as_str();
        let client = &self.client;
        let api_key = self.api_key.as_str();
        let request = &request;

        with_retry("OpenAI", self.retry, move || async move {
            let response = client.post(url)
                .header(header::CONTENT_TYPE, "application/json")
                .bearer_auth(api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| transport_error("OpenAI", e))?;

            if !response.status().is_success() {
                return Err(status_error("OpenAI", response).await);
            }

            response.json::<OpenAIResponse>().await
                .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))
        }).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = OpenAIRequest::new(self.probe_model.clone())
            .add_message("user", "Hello")
            .max_tokens(5);
        self.complete(request).await.map(|_| ())
    }

    fn extract_text(response: &Self::Response) -> String {
        response.choices.first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}
