/*!
 * Batch translation.
 *
 * One batch is one request: the texts go out as a numbered JSON payload and
 * the reply is mapped back by position. Whatever the reply looks like, the
 * result has exactly one text per input text.
 */

use log::{debug, warn};

use crate::errors::TranslationError;

use super::core::{CompletionBackend, TranslationService};
use super::prompts::BatchPromptBuilder;
use super::response::{self, BatchOutcome, BatchWarning};

/// Translator for one batch of subtitle texts
#[derive(Debug)]
pub struct BatchTranslator<B: CompletionBackend = TranslationService> {
    /// The completion backend to use
    backend: B,
}

impl<B: CompletionBackend> BatchTranslator<B> {
    /// Create a new batch translator
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The backend this translator sends requests to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Translate a batch of texts
    ///
    /// Returns one text per input, in input order. A reply that cannot be
    /// matched keeps the source texts and reports why in the outcome's
    /// warnings. A service failure that would hit every later batch the same
    /// way (unreachable service, rejected credential) is returned as an error.
    pub async fn translate<S: AsRef<str>>(
        &self,
        texts: &[S],
        source_language: &str,
        target_language: &str,
    ) -> Result<BatchOutcome, TranslationError> {
        if texts.is_empty() {
            return Ok(BatchOutcome {
                texts: Vec::new(),
                warnings: Vec::new(),
            });
        }

        let prompt = BatchPromptBuilder::new(source_language, target_language)
            .with_texts(texts)
            .build();

        debug!("Sending batch of {} texts ({} -> {})", texts.len(), source_language, target_language);

        let outcome = match self.backend.complete_chat(&prompt.system, &prompt.user).await {
            Ok(reply) => response::parse_reply(&reply, texts),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => BatchOutcome::originals(texts, BatchWarning::ServiceFailed(e.to_string())),
        };

        for warning in &outcome.warnings {
            warn!("Batch of {} texts: {}", texts.len(), warning);
        }

        Ok(outcome)
    }
}
