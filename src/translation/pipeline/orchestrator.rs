/*!
 * Pipeline orchestrator for resumable batch translation.
 *
 * The orchestrator owns the batch loop:
 * 1. Parse the source file and load the matching checkpoint
 * 2. Translate the remaining entries one batch at a time
 * 3. After each batch, save the checkpoint and rewrite the output file
 * 4. Remove the checkpoint once every entry is translated
 */

use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

use crate::checkpoint::CheckpointStore;
use crate::errors::TranslationError;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::translation::batch::BatchTranslator;
use crate::translation::core::{CompletionBackend, TranslationService};
use crate::translation::response::BatchWarning;

/// Length of the per-entry previews written at debug level
const PREVIEW_CHARS: usize = 50;

/// Called with `(entries_done, entry_count)` after every completed batch
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Every translated entry, in source order
    pub entries: Vec<SubtitleEntry>,

    /// Number of entries taken over from the checkpoint
    pub resumed_from: usize,

    /// Number of batches sent during this run
    pub batches_translated: usize,

    /// Degradations absorbed during this run
    pub warnings: Vec<BatchWarning>,
}

impl PipelineResult {
    /// Whether this run continued a previous one
    pub fn was_resumed(&self) -> bool {
        self.resumed_from > 0
    }

    /// Get a summary of the pipeline result.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{} entries in {} batch(es)",
            self.entries.len(),
            self.batches_translated
        )];

        if self.was_resumed() {
            parts.push(format!("resumed after {} entries", self.resumed_from));
        }

        if !self.warnings.is_empty() {
            parts.push(format!("{} warning(s)", self.warnings.len()));
        }

        parts.join(" | ")
    }
}

/// The resumable batch translation pipeline.
pub struct TranslationPipeline<B: CompletionBackend = TranslationService> {
    translator: BatchTranslator<B>,
    batch_size: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<B: CompletionBackend> TranslationPipeline<B> {
    /// Create a new pipeline.
    ///
    /// A batch size of zero is rejected.
    pub fn new(translator: BatchTranslator<B>, batch_size: usize) -> Result<Self, TranslationError> {
        if batch_size == 0 {
            return Err(TranslationError::InvalidSettings(
                "batch size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            translator,
            batch_size,
            progress_callback: None,
        })
    }

    /// Report progress after every batch.
    pub fn with_progress_callback(mut self, callback: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// The translator used for each batch
    pub fn translator(&self) -> &BatchTranslator<B> {
        &self.translator
    }

    /// Number of entries per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Translate `input` into `output`, resuming from a previous run if possible.
    ///
    /// Errors leave the output file and its checkpoint at the last completed
    /// batch.
    pub async fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        source_language: &str,
        target_language: &str,
    ) -> Result<PipelineResult, TranslationError> {
        let start_time = Instant::now();
        let output = output.as_ref();

        let source = SubtitleCollection::from_srt_file(input.as_ref())?.entries;
        let entry_count = source.len();
        let checkpoint = CheckpointStore::for_output(output);

        let mut translated = checkpoint.load_for(&source);
        let resumed_from = translated.len();
        if resumed_from > 0 {
            info!(
                "Resuming from checkpoint: {} of {} entries already translated",
                resumed_from, entry_count
            );
            self.report_progress(resumed_from, entry_count);
        }

        let total_batches = entry_count.div_ceil(self.batch_size);
        let mut batches_translated = 0;
        let mut warnings = Vec::new();

        for batch_start in (resumed_from..entry_count).step_by(self.batch_size) {
            let batch_end = (batch_start + self.batch_size).min(entry_count);
            let batch = &source[batch_start..batch_end];

            info!(
                "Translating batch {}/{} (entries {}-{} of {})",
                batch_start / self.batch_size + 1,
                total_batches,
                batch_start + 1,
                batch_end,
                entry_count
            );

            let texts: Vec<&str> = batch.iter().map(|e| e.text.as_str()).collect();
            let outcome = self
                .translator
                .translate(&texts, source_language, target_language)
                .await?;

            for (entry, text) in batch.iter().zip(outcome.texts) {
                let new_entry = entry.with_text(text);
                debug!(
                    "#{} {} -> {}",
                    entry.index,
                    entry.preview(PREVIEW_CHARS),
                    new_entry.preview(PREVIEW_CHARS)
                );
                translated.push(new_entry);
            }
            warnings.extend(outcome.warnings);
            batches_translated += 1;

            checkpoint.save(&translated);
            SubtitleCollection::write_entries(&translated, output)?;

            self.report_progress(translated.len(), entry_count);
        }

        // Nothing was sent: still make sure the output reflects the checkpoint
        if batches_translated == 0 {
            SubtitleCollection::write_entries(&translated, output)?;
        }

        if !checkpoint.discard() {
            warn!("Translation finished but the checkpoint could not be removed");
        }

        info!(
            "Translated {} entries in {:.2}s ({} batch(es) this run)",
            entry_count,
            start_time.elapsed().as_secs_f64(),
            batches_translated
        );

        Ok(PipelineResult {
            entries: translated,
            resumed_from,
            batches_translated,
            warnings,
        })
    }

    fn report_progress(&self, done: usize, total: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback(done, total);
        }
    }
}

/// Translate a subtitle file with a fresh pipeline and return the translated entries.
pub async fn translate_file<B: CompletionBackend, P: AsRef<Path>, Q: AsRef<Path>>(
    translator: BatchTranslator<B>,
    input: P,
    output: Q,
    source_language: &str,
    target_language: &str,
    batch_size: usize,
) -> Result<Vec<SubtitleEntry>, TranslationError> {
    let pipeline = TranslationPipeline::new(translator, batch_size)?;
    let result = pipeline.run(input, output, source_language, target_language).await?;
    Ok(result.entries)
}
