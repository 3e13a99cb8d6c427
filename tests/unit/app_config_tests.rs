/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::str::FromStr;

use vttai::app_config::{
    Config, LogLevel, PipelineConfig, ProviderConfig, TranslationConfig, TranslationProvider, DEFAULT_BATCH_SIZE,
};
use vttai::errors::AppError;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.log_level, LogLevel::Info);

    let ollama_config = config.translation.get_provider_config(&TranslationProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama_config.model, "llama2");
    assert_eq!(ollama_config.endpoint, "http://localhost:11434");
    assert_eq!(ollama_config.timeout_secs, 30);
    assert_eq!(ollama_config.rate_limit, None);

    assert_eq!(config.translation.common.retry_count, 3);
    assert_eq!(config.translation.common.retry_backoff_ms, 1000);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    config.source_language = "en".to_string();

    config.target_language = "".to_string();
    assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    config.target_language = "fr".to_string();

    // OpenAI needs an API key
    config.translation.provider = TranslationProvider::OpenAI;
    assert!(matches!(config.validate(), Err(AppError::Configuration(_))));

    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());

    // LM Studio does not
    config.translation.provider = TranslationProvider::LMStudio;
    assert!(config.validate().is_ok());
}

#[test]
fn test_translation_config_withMissingProviderEntry_shouldFallBackToDefaults() {
    let config = TranslationConfig {
        provider: TranslationProvider::Anthropic,
        available_providers: Vec::new(),
        ..TranslationConfig::default()
    };

    assert_eq!(config.get_model(), "claude-3-haiku-20240307");
    assert_eq!(config.get_endpoint(), "https://api.anthropic.com");
    assert_eq!(config.get_rate_limit(), Some(45));
    assert_eq!(config.get_api_key(), "");
}

#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldCreateIt() {
    let mut config = TranslationConfig {
        provider: TranslationProvider::LMStudio,
        available_providers: vec![ProviderConfig::new(TranslationProvider::Ollama)],
        ..TranslationConfig::default()
    };

    config.active_provider_config_mut().model = "qwen2.5-7b".to_string();

    assert_eq!(config.available_providers.len(), 2);
    assert_eq!(config.get_model(), "qwen2.5-7b");
}

#[test]
fn test_provider_from_str_withKnownAndUnknownNames_shouldParse() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("lmstudio").unwrap(), TranslationProvider::LMStudio);
    assert!(TranslationProvider::from_str("deepl").is_err());
    assert_eq!(TranslationProvider::LMStudio.to_string(), "lmstudio");
    assert_eq!(TranslationProvider::LMStudio.display_name(), "LM Studio");
}

#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "source_language": "en",
        "target_language": "es",
        "translation": {
            "provider": "openai",
            "available_providers": [
                { "type": "openai", "model": "gpt-4", "api_key": "sk-test" }
            ]
        }
    }"#;

    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.get_model(), "gpt-4");
    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
    assert_eq!(config.translation.get_timeout_secs(), 30);
    assert_eq!(config.translation.common.temperature, 0.3);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaultConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.target_language, "fr");

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.translation.get_model(), config.translation.get_model());
    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_pipeline_config_withValidValues_shouldExposeThem() {
    let config = PipelineConfig::new(4, "de").unwrap();
    assert_eq!(config.batch_size(), 4);
    assert_eq!(config.target_language(), "de");

    let defaults = PipelineConfig::with_defaults("fra").unwrap();
    assert_eq!(defaults.batch_size(), DEFAULT_BATCH_SIZE);
    assert_eq!(DEFAULT_BATCH_SIZE, 10);
}

#[test]
fn test_pipeline_config_withZeroBatchSize_shouldBeRejected() {
    assert!(matches!(PipelineConfig::new(0, "fr"), Err(AppError::Configuration(_))));
}

#[test]
fn test_pipeline_config_withUnknownLanguage_shouldBeRejected() {
    assert!(matches!(PipelineConfig::new(10, "klingon"), Err(AppError::Configuration(_))));
    assert!(matches!(PipelineConfig::new(10, ""), Err(AppError::Configuration(_))));
}

#[test]
fn test_log_level_to_level_filter_withEachLevel_shouldMatch() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
}
