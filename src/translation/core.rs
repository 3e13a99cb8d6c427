/*!
 * LLM-backed translation service.
 *
 * `TranslationService` owns one provider client chosen from the
 * configuration and implements `TranslationBackend` on top of it: a batch
 * is rendered as numbered entries, sent in a single request, and the reply
 * is split back into one line per entry.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{AppError, ProviderError, TranslationError};
use crate::language_utils;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::{Provider, RetryPolicy};

use super::backend::TranslationBackend;
use super::formatting::{build_batch_text, parse_batch_response, truncate_entry, MAX_ENTRY_CHARS};

// Appended to every system prompt so replies keep the entry markers
const ENTRY_FORMAT_INSTRUCTIONS: &str = "The input is a list of entries, each introduced by a marker such as ENTRY_0:. \
Reply with the same markers in the same order, each followed by the translation of that entry only. \
Do not merge, split, skip or explain entries.";

/// Normalize an endpoint string into a base URL without trailing slash
///
/// A missing scheme defaults to `http`. Port and path prefix are kept as
/// given, e.g. `gpu.lan:8080/ollama` becomes `http://gpu.lan:8080/ollama`.
fn parse_endpoint(endpoint: &str) -> Result<String, AppError> {
    if endpoint.is_empty() {
        return Err(AppError::Configuration("Endpoint cannot be empty".to_string()));
    }

    let mut url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    }
    .map_err(|e| AppError::Configuration(format!("Invalid endpoint {}: {}", endpoint, e)))?;

    if url.host().is_none() {
        return Err(AppError::Configuration(format!("Invalid host in endpoint: {}", endpoint)));
    }

    url.set_query(None);
    url.set_fragment(None);

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Get the maximum number of tokens to request for a given model
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        "gpt-4" | "gpt-4-0613" => 8192,
        "gpt-4-32k" | "gpt-4-32k-0613" => 32768,
        "gpt-4-turbo" | "gpt-4-turbo-preview" | "gpt-4o" | "gpt-4o-mini" => 4096,
        "gpt-3.5-turbo" | "gpt-3.5-turbo-0125" => 4096,
        "gpt-3.5-turbo-16k" => 16384,

        "claude-3-opus-20240229" | "claude-3-sonnet-20240229" | "claude-3-haiku-20240307" => 4096,
        "claude-3-5-sonnet-20240620" | "claude-3-5-sonnet-20241022" => 8192,

        _ => 2048,
    }
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio {
        /// Client instance (OpenAI-compatible)
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Translation service backed by one configured LLM provider
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    config: TranslationConfig,

    /// Source language code, used only to phrase the prompt
    source_language: String,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig, source_language: impl Into<String>) -> Result<Self, AppError> {
        let retry = RetryPolicy {
            max_retries: config.common.retry_count,
            backoff_base_ms: config.common.retry_backoff_ms,
            rate_limit: config.get_rate_limit(),
        };
        let timeout = Duration::from_secs(config.get_timeout_secs());
        let model = config.get_model();

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let base_url = parse_endpoint(&config.get_endpoint())?;
                TranslationProviderImpl::Ollama {
                    client: Ollama::new_with_config(base_url, retry, timeout),
                }
            }
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new_with_config(config.get_api_key(), config.get_endpoint(), retry, timeout)
                    .with_probe_model(model),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio accepts any key but the header must be present
                let api_key = Some(config.get_api_key())
                    .filter(|key| !key.is_empty())
                    .unwrap_or_else(|| "lm-studio".to_string());
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::new_with_config(api_key, config.get_endpoint(), retry, timeout)
                        .with_probe_model(model),
                }
            }
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new_with_config(config.get_api_key(), config.get_endpoint(), retry, timeout)
                    .with_probe_model(model),
            },
        };

        Ok(Self {
            provider,
            config,
            source_language: source_language.into(),
        })
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Human readable name of the active provider
    pub fn provider_name(&self) -> &str {
        self.config.provider.display_name()
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        debug!("Testing connection to {} with model {}", self.provider_name(), self.config.get_model());

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                client.test_connection().await
            }
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
        }
    }

    /// System prompt for one request, placeholders replaced by language names
    pub fn system_prompt(&self, target_language: &str) -> String {
        let source_name = language_utils::get_language_name(&self.source_language)
            .unwrap_or_else(|_| self.source_language.clone());
        let target_name = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());

        let prompt = self.config.common.system_prompt
            .replace("{source_language}", &source_name)
            .replace("{target_language}", &target_name);

        format!("{}\n\n{}", prompt.trim_end(), ENTRY_FORMAT_INSTRUCTIONS)
    }

    /// Send one prompt to the provider and return the raw reply text
    async fn complete_text(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(model, user_prompt)
                    .system(system_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let max_tokens = max_tokens_for_model(&model);
                let request = OpenAIRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature)
                    .max_tokens(max_tokens);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            TranslationProviderImpl::Anthropic { client } => {
                let max_tokens = max_tokens_for_model(&model);
                let request = AnthropicRequest::new(model, max_tokens)
                    .system(system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
        }
    }
}

#[async_trait]
impl TranslationBackend for TranslationService {
    async fn translate(&self, batch: &[String], target_language: &str) -> Result<Vec<String>, TranslationError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<String> = batch.iter()
            .map(|line| truncate_entry(line, MAX_ENTRY_CHARS))
            .collect();
        let user_prompt = build_batch_text(&entries);
        let system_prompt = self.system_prompt(target_language);

        let start_time = Instant::now();
        let reply = self.complete_text(&system_prompt, &user_prompt).await?;
        debug!("{} answered a batch of {} in {:?}", self.provider_name(), batch.len(), start_time.elapsed());

        if reply.trim().is_empty() {
            return Err(TranslationError::Backend(format!("{} returned an empty response", self.provider_name())));
        }

        let translations = parse_batch_response(&reply, batch.len());
        if translations.len() != batch.len() {
            warn!(
                "{} returned {} of {} entries",
                self.provider_name(),
                translations.len(),
                batch.len()
            );
        }

        Ok(translations)
    }
}
