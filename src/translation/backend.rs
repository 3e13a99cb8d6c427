/*!
 * The translation capability consumed by the document pipeline.
 *
 * A backend receives an ordered batch of source lines and a target language
 * code and must answer with exactly one translated line per source line, in
 * the same order. The pipeline checks the length; backends never pad.
 */

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::TranslationError;

/// Anything able to translate a batch of subtitle lines
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `batch` into `target_language`
    ///
    /// # Arguments
    /// * `batch` - Trimmed dialogue lines, in document order
    /// * `target_language` - ISO 639 code of the language to translate into
    ///
    /// # Returns
    /// * `Result<Vec<String>, TranslationError>` - One translation per input line
    async fn translate(&self, batch: &[String], target_language: &str) -> Result<Vec<String>, TranslationError>;
}

#[async_trait]
impl<T: TranslationBackend + ?Sized> TranslationBackend for &T {
    async fn translate(&self, batch: &[String], target_language: &str) -> Result<Vec<String>, TranslationError> {
        (**self).translate(batch, target_language).await
    }
}

#[async_trait]
impl<T: TranslationBackend + ?Sized> TranslationBackend for Arc<T> {
    async fn translate(&self, batch: &[String], target_language: &str) -> Result<Vec<String>, TranslationError> {
        (**self).translate(batch, target_language).await
    }
}

#[async_trait]
impl<T: TranslationBackend + ?Sized> TranslationBackend for Box<T> {
    async fn translate(&self, batch: &[String], target_language: &str) -> Result<Vec<String>, TranslationError> {
        (**self).translate(batch, target_language).await
    }
}

/// Adapter turning a plain synchronous function into a backend,
/// mostly useful for stubs in tests and benchmarks
pub struct FnBackend<F>(pub F);

impl<F> FnBackend<F>
where
    F: Fn(&[String], &str) -> Result<Vec<String>, TranslationError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> TranslationBackend for FnBackend<F>
where
    F: Fn(&[String], &str) -> Result<Vec<String>, TranslationError> + Send + Sync,
{
    async fn translate(&self, batch: &[String], target_language: &str) -> Result<Vec<String>, TranslationError> {
        (self.0)(batch, target_language)
    }
}
