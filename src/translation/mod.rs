/*!
 * Translation of subtitle files using AI providers.
 *
 * This module contains the translation functionality, split into several
 * submodules:
 *
 * - `core`: The provider-backed completion service and token accounting
 * - `prompts`: Prompt templates and the JSON batch payload
 * - `response`: Lenient parsing of batch replies
 * - `batch`: Translation of a single batch of texts
 * - `pipeline`: The resumable, checkpointed batch loop over a whole file
 */

// Re-export main types for easier usage
pub use self::batch::BatchTranslator;
pub use self::core::{CompletionBackend, TokenUsageStats, TranslationService};
pub use self::pipeline::{translate_file, PipelineResult, TranslationPipeline};
pub use self::response::{BatchOutcome, BatchWarning};

// Re-export prompt types
pub use self::prompts::{BatchPromptBuilder, PromptTemplate};

// Submodules
pub mod batch;
pub mod core;
pub mod pipeline;
pub mod prompts;
pub mod response;
