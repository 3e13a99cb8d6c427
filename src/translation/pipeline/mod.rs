/*!
 * Document translation pipeline.
 *
 * - `orchestrator`: the streaming batch-and-reassemble engine
 * - `sink`: where emitted lines go (memory or any `std::io::Write`)
 */

pub mod orchestrator;
pub mod sink;

// Re-export types used externally
pub use orchestrator::{DocumentTranslator, PipelineStats};
pub use sink::{LineSink, WriteSink};
