/*!
 * Prompt templates for subtitle translation.
 *
 * A batch is sent as a JSON array of `{"id", "text"}` items where `id` is the
 * position inside the batch. The model is asked to answer with the same
 * array shape, which is what `translation::response` parses.
 */

use serde::{Deserialize, Serialize};

use crate::language_utils;

/// System prompt template for subtitle translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for batch subtitle translation.
    pub const BATCH_TRANSLATOR: &'static str = r#"You are a professional subtitle translator. Translate subtitles from {source_language} to {target_language}.

You will receive a JSON array with {count} subtitle entries, each with an "id" and "text" field.

CRITICAL RULES:
1. Return a JSON array with the same structure, keeping the same "id" for each entry
2. Translate ONLY the "text" field for each entry
3. Keep translations concise and appropriate for subtitles
4. Preserve speaker indicators like [SPEAKER], (sound effects), etc.
5. Maintain line breaks within the subtitle text
6. Do NOT add explanations or extra text outside the JSON
7. Ensure you return exactly {count} entries with the same IDs

Example format:
Input: [{"id": 0, "text": "Hello world"}, {"id": 1, "text": "How are you?"}]
Output: [{"id": 0, "text": "Hola mundo"}, {"id": 1, "text": "¿Cómo estás?"}]

Your response must be valid JSON only."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default batch translator template.
    pub fn batch_translator() -> Self {
        Self::new(Self::BATCH_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str, count: usize) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
            .replace("{count}", &count.to_string())
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::batch_translator()
    }
}

/// One entry of a batch request, correlated to the reply by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position of the text inside the batch (0-based)
    pub id: usize,
    /// Text to translate
    pub text: String,
}

/// The two messages sent for one batch.
#[derive(Debug, Clone)]
pub struct BatchPrompt {
    /// Instructions for the model
    pub system: String,
    /// Request payload
    pub user: String,
}

/// Builder for batch translation prompts.
#[derive(Debug, Clone)]
pub struct BatchPromptBuilder {
    source_language: String,
    target_language: String,
    template: PromptTemplate,
    items: Vec<BatchItem>,
}

impl BatchPromptBuilder {
    /// Create a new prompt builder.
    ///
    /// ISO codes are rendered as language names ("fr" becomes "French").
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: language_utils::prompt_language_name(source_language),
            target_language: language_utils::prompt_language_name(target_language),
            template: PromptTemplate::default(),
            items: Vec::new(),
        }
    }

    /// Use a custom system prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Set the texts to translate; ids follow their order.
    pub fn with_texts<S: AsRef<str>>(mut self, texts: &[S]) -> Self {
        self.items = texts
            .iter()
            .enumerate()
            .map(|(id, text)| BatchItem {
                id,
                text: text.as_ref().to_string(),
            })
            .collect();
        self
    }

    /// Items that will be sent
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        self.template
            .render(&self.source_language, &self.target_language, self.items.len())
    }

    /// Build the user message carrying the JSON payload.
    pub fn build_user_prompt(&self) -> String {
        let payload = serde_json::to_string_pretty(&self.items)
            .unwrap_or_else(|_| "[]".to_string());
        format!("Translate the following subtitle texts:\n\n{}", payload)
    }

    /// Build both messages.
    pub fn build(&self) -> BatchPrompt {
        BatchPrompt {
            system: self.build_system_prompt(),
            user: self.build_user_prompt(),
        }
    }
}

/// Extract the request items back out of a user message built by `BatchPromptBuilder`.
///
/// Used by the mock provider to answer like a well-behaved model.
pub fn items_from_user_prompt(user_prompt: &str) -> Option<Vec<BatchItem>> {
    let start = user_prompt.find('[')?;
    serde_json::from_str(&user_prompt[start..]).ok()
}
