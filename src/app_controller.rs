use log::{error, info, warn};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app_config::{Config, PipelineConfig};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleDocument;
use crate::translation::{DocumentTranslator, LineSink, PipelineStats, TranslationBackend, TranslationService, WriteSink};

// @module: Application controller for subtitle file translation

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Draw a progress bar while translating
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            show_progress: true,
        }
    }

    /// Enable or disable the terminal progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate `source` into `destination` with the configured LLM provider
    pub async fn translate_file(&self, source: &Path, destination: &Path) -> Result<PipelineStats, AppError> {
        self.config.validate()?;

        let service = TranslationService::new(
            self.config.translation.clone(),
            self.config.source_language.clone(),
        )?;

        info!("🚀 vttai: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model());

        self.translate_file_with_backend(service, source, destination).await
    }

    /// Check that the configured provider answers before translating anything
    pub async fn test_connection(&self) -> Result<(), AppError> {
        self.config.validate()?;

        let service = TranslationService::new(
            self.config.translation.clone(),
            self.config.source_language.clone(),
        )?;

        service.test_connection().await?;
        info!("✅ {} is reachable ({})",
            self.config.translation.provider.display_name(),
            self.config.translation.get_endpoint());
        Ok(())
    }

    /// Translate `source` into `destination` through the given backend.
    ///
    /// The destination is written batch by batch, so a failing backend
    /// leaves every line emitted before the failure on disk.
    pub async fn translate_file_with_backend<B: TranslationBackend>(
        &self,
        backend: B,
        source: &Path,
        destination: &Path,
    ) -> Result<PipelineStats, AppError> {
        let start_time = Instant::now();

        let pipeline_config = PipelineConfig::with_defaults(self.config.target_language.clone())?;

        if !FileManager::file_exists(source) {
            return Err(AppError::InputNotFound(source.to_path_buf()));
        }
        if !FileManager::is_vtt_file(source) {
            warn!("{:?} does not have a .vtt extension, translating it anyway", source);
        }

        let document = SubtitleDocument::read_from_file(source)
            .map_err(|e| Self::read_error(source, e))?;

        let writer = FileManager::create_file(destination)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;
        let mut sink = WriteSink::new(writer);

        let translator = DocumentTranslator::new(backend, pipeline_config);
        let progress_bar = self.create_progress_bar(document.len());

        let result = translator
            .translate_document_with_progress(document.lines(), &mut sink, |processed, _| {
                progress_bar.set_position(processed as u64);
            })
            .await;

        match result {
            Ok(stats) => {
                progress_bar.finish_and_clear();
                info!(
                    "Translation completed in {}: {}",
                    Self::format_duration(start_time.elapsed()),
                    stats.summary()
                );
                Ok(stats)
            }
            Err(e) => {
                progress_bar.abandon();
                // Lines emitted before the failure stay in the destination
                if let Err(flush_error) = sink.end_batch() {
                    error!("Failed to flush partial output to {:?}: {}", destination, flush_error);
                }
                error!("Translation of {:?} failed: {}", source, e);
                Err(e.into())
            }
        }
    }

    // @maps: Missing or unreadable source to InputNotFound, anything else to a file error
    fn read_error(source: &Path, error: anyhow::Error) -> AppError {
        let kind = error.chain()
            .find_map(|cause| cause.downcast_ref::<io::Error>())
            .map(io::Error::kind);

        match kind {
            Some(io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
                AppError::InputNotFound(source.to_path_buf())
            }
            _ => AppError::File(format!("{:#}", error)),
        }
    }

    fn create_progress_bar(&self, total_lines: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total_lines as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
