use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;

// @module: Application configuration
// Loading, validating and saving the JSON config file, plus the
// per-document pipeline settings handed to the segmentation engine.

/// Number of dialogue lines sent to the backend in one request
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO), only used to phrase the prompt
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    #[default]
    Ollama,
    OpenAI,
    Anthropic,
    /// LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Whether requests to this provider must carry an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: match provider_type {
                TranslationProvider::Anthropic => default_anthropic_timeout_secs(),
                _ => default_timeout_secs(),
            },
            rate_limit: default_rate_limit(&provider_type),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed HTTP requests inside a provider client
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Settings for translating one document.
///
/// Built once per job and never mutated afterwards, so the fields are only
/// reachable through getters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    batch_size: usize,
    target_language: String,
}

impl PipelineConfig {
    /// Create a pipeline configuration, rejecting a zero batch size and
    /// target languages that are not ISO 639 codes
    pub fn new(batch_size: usize, target_language: impl Into<String>) -> Result<Self, AppError> {
        let target_language = target_language.into();

        if batch_size == 0 {
            return Err(AppError::Configuration("batch size must be at least 1".to_string()));
        }

        crate::language_utils::validate_language_code(&target_language)
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self {
            batch_size,
            target_language: target_language.trim().to_string(),
        })
    }

    /// Pipeline configuration with the default batch size
    pub fn with_defaults(target_language: impl Into<String>) -> Result<Self, AppError> {
        Self::new(DEFAULT_BATCH_SIZE, target_language)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        // LM Studio serves the OpenAI API on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "llama2".to_string(),
        TranslationProvider::OpenAI => "gpt-3.5-turbo".to_string(),
        TranslationProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_rate_limit(provider: &TranslationProvider) -> Option<u32> {
    match provider {
        TranslationProvider::OpenAI => Some(60),
        // Anthropic allows 50 requests per minute
        TranslationProvider::Anthropic => Some(45),
        TranslationProvider::Ollama | TranslationProvider::LMStudio => None,
    }
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the following subtitle lines from {source_language} to {target_language}. Keep the meaning and tone of each line.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        crate::language_utils::get_language_name(&self.source_language)
            .map_err(|e| AppError::Configuration(format!("source language: {}", e)))?;
        crate::language_utils::get_language_name(&self.target_language)
            .map_err(|e| AppError::Configuration(format!("target language: {}", e)))?;

        if self.translation.provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(AppError::Configuration(format!(
                "Translation API key is required for {} provider",
                self.translation.provider.display_name()
            )));
        }

        Ok(())
    }

    /// Load the configuration from a JSON file, writing a default one when the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, creating it when absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(index) = self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            return &mut self.available_providers[index];
        }
        self.available_providers.push(ProviderConfig::new(self.provider.clone()));
        let last = self.available_providers.len() - 1;
        &mut self.available_providers[last]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => default_rate_limit(&self.provider),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
