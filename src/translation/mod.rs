/*!
 * Translation of subtitle documents.
 *
 * - `backend`: The batch translation capability the pipeline depends on
 * - `batch`: Bounded accumulation of dialogue lines between flushes
 * - `pipeline`: Document segmentation, flushing and in-order reassembly
 * - `core`: LLM-backed backend over the configured provider
 * - `formatting`: Entry markers used to talk to the LLM
 */

// Re-export main types for easier usage
pub use self::backend::{FnBackend, TranslationBackend};
pub use self::batch::{BatchAccumulator, FlushTrigger};
pub use self::core::TranslationService;
pub use self::pipeline::{DocumentTranslator, LineSink, PipelineStats, WriteSink};

// Submodules
pub mod backend;
pub mod batch;
pub mod core;
pub mod formatting;
pub mod pipeline;
