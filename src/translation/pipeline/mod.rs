/*!
 * Resumable translation pipeline.
 *
 * The pipeline walks a subtitle file batch by batch:
 * 1. **Resume**: reuse the part of a previous run recorded in the checkpoint
 * 2. **Translate**: send the next batch and merge the reply into new entries
 * 3. **Persist**: save the checkpoint, then rewrite the whole output file
 *
 * An interrupted run leaves the output and checkpoint at the last completed
 * batch; running the same command again picks up from there.
 */

pub mod orchestrator;

// Re-export types used externally
pub use orchestrator::{translate_file, PipelineResult, ProgressCallback, TranslationPipeline};
