/*!
 * Integration tests for file-to-file translation through the controller
 */

use anyhow::Result;
use std::fs;

use vttai::app_config::{Config, TranslationProvider};
use vttai::errors::{AppError, TranslationError};
use vttai::Controller;

use crate::common;
use crate::common::mock_llm_server::{ollama_uppercase_reply, JSON_CONTENT_TYPE};
use crate::common::mock_backends::{MockBackend, MockBehavior};

fn controller_for(target_language: &str) -> Controller {
    common::init_test_logging();
    let config = Config {
        target_language: target_language.to_string(),
        ..Config::default()
    };
    Controller::with_config(config).with_progress(false)
}

#[tokio::test]
async fn test_translate_file_with_backend_withSampleFile_shouldWriteTranslatedDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.en.vtt")?;
    let destination = temp_dir.path().join("movie.fr.vtt");

    let stats = controller_for("fr")
        .translate_file_with_backend(MockBackend::uppercase(), &source, &destination)
        .await?;

    let written = fs::read_to_string(&destination)?;
    assert_eq!(
        written,
        "WEBVTT\n\n00:01.000 --> 00:04.000\nHELLO THERE\nHOW ARE YOU?\n\n00:05.000 --> 00:08.000 align:start\nFINE, THANKS.\n"
    );
    assert_eq!(stats.translated_lines, 4);
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withCrlfInput_shouldKeepStructuralTerminators() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(
        temp_dir.path(),
        "crlf.vtt",
        "00:01.000 --> 00:02.000\r\nHello\r\n\r\n00:03.000 --> 00:04.000\r\nBye",
    )?;
    let destination = temp_dir.path().join("crlf.out.vtt");

    controller_for("fr")
        .translate_file_with_backend(MockBackend::identity(), &source, &destination)
        .await?;

    assert_eq!(
        fs::read_to_string(&destination)?,
        "00:01.000 --> 00:02.000\r\nHello\n\r\n00:03.000 --> 00:04.000\r\nBye\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withNestedDestination_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.vtt")?;
    let destination = temp_dir.path().join("out/fr/movie.vtt");

    controller_for("fr")
        .translate_file_with_backend(MockBackend::identity(), &source, &destination)
        .await?;

    assert!(destination.is_file());
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withMissingSource_shouldReturnInputNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("missing.vtt");
    let destination = temp_dir.path().join("out.vtt");
    let backend = MockBackend::identity();
    let calls = backend.call_log();

    let result = controller_for("fr")
        .translate_file_with_backend(backend, &source, &destination)
        .await;

    assert!(matches!(result, Err(AppError::InputNotFound(path)) if path == source));
    assert!(!destination.exists());
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withDirectoryAsSource_shouldReturnInputNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let destination = temp_dir.path().join("out.vtt");

    let result = controller_for("fr")
        .translate_file_with_backend(MockBackend::identity(), temp_dir.path(), &destination)
        .await;

    assert!(matches!(result, Err(AppError::InputNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withInvalidLanguage_shouldFailBeforeTouchingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("missing.vtt");
    let destination = temp_dir.path().join("out.vtt");

    let result = controller_for("not-a-language")
        .translate_file_with_backend(MockBackend::identity(), &source, &destination)
        .await;

    // Configuration is checked before the missing input is noticed
    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert!(!destination.exists());
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withBackendFailure_shouldKeepEarlierBatchesOnDisk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.vtt")?;
    let destination = temp_dir.path().join("partial.vtt");

    let result = controller_for("fr")
        .translate_file_with_backend(MockBackend::new(MockBehavior::FailOnCall(1)), &source, &destination)
        .await;

    assert!(matches!(result, Err(AppError::Translation(TranslationError::Backend(_)))));
    // Everything emitted before the failing batch is flushed, the failing batch is not
    assert_eq!(fs::read_to_string(&destination)?, "WEBVTT\n\n00:01.000 --> 00:04.000\n");
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withLongBackend_shouldReportCardinalityError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.vtt")?;
    let destination = temp_dir.path().join("long.vtt");

    let result = controller_for("fr")
        .translate_file_with_backend(MockBackend::new(MockBehavior::LongByOne), &source, &destination)
        .await;

    assert!(matches!(
        result,
        Err(AppError::Translation(TranslationError::Cardinality { expected: 1, actual: 2 }))
    ));
    assert_eq!(fs::read_to_string(&destination)?, "");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_translate_file_with_backend_withUnreadableSource_shouldReturnInputNotFound() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "locked.vtt")?;
    let destination = temp_dir.path().join("out.vtt");
    fs::set_permissions(&source, fs::Permissions::from_mode(0o000))?;
    if fs::read(&source).is_ok() {
        // Running with privileges that ignore file modes
        return Ok(());
    }

    let result = controller_for("fr")
        .translate_file_with_backend(MockBackend::identity(), &source, &destination)
        .await;

    assert!(matches!(result, Err(AppError::InputNotFound(path)) if path == source));
    assert!(!destination.exists());
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withInvalidUtf8_shouldReturnFileError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("binary.vtt");
    fs::write(&source, [0xff, 0xfe, 0x00, 0x41])?;
    let destination = temp_dir.path().join("out.vtt");

    let result = controller_for("fr")
        .translate_file_with_backend(MockBackend::identity(), &source, &destination)
        .await;

    assert!(matches!(result, Err(AppError::File(_))));
    Ok(())
}

#[tokio::test]
async fn test_translate_file_with_backend_withShortBackend_shouldReportCardinalityError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.vtt")?;
    let destination = temp_dir.path().join("short.vtt");

    let result = controller_for("fr")
        .translate_file_with_backend(MockBackend::new(MockBehavior::ShortByOne), &source, &destination)
        .await;

    assert!(matches!(
        result,
        Err(AppError::Translation(TranslationError::Cardinality { expected: 1, actual: 0 }))
    ));
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withMissingApiKey_shouldFailWithConfigurationError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.vtt")?;
    let destination = temp_dir.path().join("out.vtt");

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    let controller = Controller::with_config(config).with_progress(false);

    let result = controller.translate_file(&source, &destination).await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
    assert!(!destination.exists());
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withOllamaServer_shouldTranslateThroughProvider() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_header("content-type", JSON_CONTENT_TYPE)
        .with_body_from_request(ollama_uppercase_reply)
        .expect(3)
        .create_async()
        .await;
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "movie.vtt")?;
    let destination = temp_dir.path().join("movie.fr.vtt");

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.active_provider_config_mut().endpoint = server.url();
    let controller = Controller::with_config(config).with_progress(false);

    let stats = controller.translate_file(&source, &destination).await?;

    assert_eq!(
        fs::read_to_string(&destination)?,
        "WEBVTT\n\n00:01.000 --> 00:04.000\nHELLO THERE\nHOW ARE YOU?\n\n00:05.000 --> 00:08.000 align:start\nFINE, THANKS.\n"
    );
    assert_eq!(stats.flushes, 3);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_test_connection_withOllamaServer_shouldSucceed() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/version")
        .with_status(200)
        .with_header("content-type", JSON_CONTENT_TYPE)
        .with_body(r#"{"version":"0.5.1"}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.active_provider_config_mut().endpoint = server.url();

    Controller::with_config(config).test_connection().await?;
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_test_connection_withMissingApiKey_shouldFailWithConfigurationError() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;

    let result = Controller::with_config(config).test_connection().await;

    assert!(matches!(result, Err(AppError::Configuration(_))));
}
