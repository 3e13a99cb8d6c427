/*!
 * # vttai - WebVTT subtitle translation with AI
 *
 * Translates the dialogue of a WebVTT file while copying its cue timings
 * and blank separators through unchanged.
 *
 * ## Features
 *
 * - Line classification into structural markers and dialogue
 * - Batched translation with a configurable batch size
 * - Output written incrementally, in input order
 * - Translation through various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 *   - LM Studio (OpenAI-compatible)
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * - `subtitle_processor`: Reading documents and classifying lines
 * - `translation`: Batching pipeline and translation backends:
 *   - `translation::backend`: The `TranslationBackend` trait
 *   - `translation::batch`: Batch accumulation
 *   - `translation::pipeline`: Document segmentation and reassembly
 *   - `translation::core`: LLM-backed translation service
 *   - `translation::formatting`: Prompt entry markers
 * - `providers`: Client implementations for the LLM providers
 * - `app_config`: Configuration management
 * - `app_controller`: File-to-file translation workflow
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{Config, PipelineConfig};
pub use app_controller::Controller;
pub use subtitle_processor::{classify, LineKind, SubtitleDocument};
pub use translation::{DocumentTranslator, FnBackend, PipelineStats, TranslationBackend, TranslationService};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, ProviderError, TranslationError};
