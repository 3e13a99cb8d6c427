/*!
 * Streaming segmentation and reassembly of subtitle documents.
 *
 * The translator walks the document once, in order:
 * - dialogue lines are trimmed and collected into a bounded batch;
 * - a structural line flushes any pending batch, then is copied verbatim;
 * - a batch reaching the configured size flushes on its own;
 * - whatever is pending at the end of the document is flushed last.
 *
 * A flush sends the batch to the backend and emits one output line per
 * translation. Flushes run one at a time, so output order always matches
 * input order.
 */

use log::{debug, info};
use std::time::{Duration, Instant};

use crate::app_config::PipelineConfig;
use crate::errors::TranslationError;
use crate::subtitle_processor::{classify, LineKind};
use crate::translation::backend::TranslationBackend;
use crate::translation::batch::{BatchAccumulator, FlushTrigger};

use super::sink::LineSink;

/// Counters collected while translating one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Input lines consumed
    pub lines_read: usize,

    /// Timing and blank lines copied to the output
    pub structural_lines: usize,

    /// Lines sent to the backend
    pub dialogue_lines: usize,

    /// Translated lines written to the output
    pub translated_lines: usize,

    /// Backend calls made
    pub flushes: usize,

    /// Time spent waiting on the backend
    pub backend_time: Duration,
}

impl PipelineStats {
    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} lines ({} structural, {} dialogue) translated in {} batch(es), backend time {:.2}s",
            self.lines_read,
            self.structural_lines,
            self.dialogue_lines,
            self.flushes,
            self.backend_time.as_secs_f64()
        )
    }
}

/// Translates one document at a time through an injected backend
pub struct DocumentTranslator<B> {
    /// Translation backend
    backend: B,

    /// Batch size and target language
    config: PipelineConfig,
}

impl<B: TranslationBackend> DocumentTranslator<B> {
    /// Create a new document translator
    pub fn new(backend: B, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Translate `lines` and emit the result into `sink`
    pub async fn translate_document<S, L>(&self, lines: &[L], sink: &mut S) -> Result<PipelineStats, TranslationError>
    where
        S: LineSink + ?Sized,
        L: AsRef<str>,
    {
        self.translate_document_with_progress(lines, sink, |_, _| {}).await
    }

    /// Translate `lines` into `sink`, calling `progress_callback(processed, total)` after every input line
    pub async fn translate_document_with_progress<S, L, F>(
        &self,
        lines: &[L],
        sink: &mut S,
        progress_callback: F,
    ) -> Result<PipelineStats, TranslationError>
    where
        S: LineSink + ?Sized,
        L: AsRef<str>,
        F: Fn(usize, usize),
    {
        let total = lines.len();
        let mut stats = PipelineStats::default();
        let mut batch = BatchAccumulator::new(self.config.batch_size());

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            stats.lines_read += 1;

            match classify(line) {
                LineKind::StructuralMarker => {
                    if let Some(pending) = batch.take() {
                        self.flush(pending, FlushTrigger::Marker, sink, &mut stats).await?;
                    }
                    sink.emit(line)?;
                    stats.structural_lines += 1;
                }
                LineKind::Dialogue => {
                    stats.dialogue_lines += 1;
                    if let Some(full) = batch.append_or_flush(line.trim().to_string()) {
                        self.flush(full, FlushTrigger::BatchFull, sink, &mut stats).await?;
                    }
                }
            }

            progress_callback(index + 1, total);
        }

        if let Some(rest) = batch.take() {
            self.flush(rest, FlushTrigger::EndOfDocument, sink, &mut stats).await?;
        }
        sink.end_batch()?;

        info!("Translated document: {}", stats.summary());
        Ok(stats)
    }

    /// Translate `lines` and collect the output lines in memory
    pub async fn translate_lines<L: AsRef<str>>(&self, lines: &[L]) -> Result<Vec<String>, TranslationError> {
        let mut output = Vec::with_capacity(lines.len());
        self.translate_document(lines, &mut output).await?;
        Ok(output)
    }

    /// Send one batch to the backend and emit its translations.
    ///
    /// Nothing is emitted unless the backend answered with exactly one line
    /// per batch entry.
    async fn flush<S>(
        &self,
        batch: Vec<String>,
        trigger: FlushTrigger,
        sink: &mut S,
        stats: &mut PipelineStats,
    ) -> Result<(), TranslationError>
    where
        S: LineSink + ?Sized,
    {
        debug!("Flushing batch of {} line(s) ({})", batch.len(), trigger);

        let start_time = Instant::now();
        let translations = self.backend.translate(&batch, self.config.target_language()).await?;
        stats.backend_time += start_time.elapsed();
        stats.flushes += 1;

        if translations.len() != batch.len() {
            return Err(TranslationError::Cardinality {
                expected: batch.len(),
                actual: translations.len(),
            });
        }

        for translation in &translations {
            sink.emit(&format!("{}\n", translation))?;
        }
        stats.translated_lines += translations.len();
        sink.end_batch()?;

        Ok(())
    }
}
