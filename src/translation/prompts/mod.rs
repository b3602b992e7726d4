/*!
 * Prompt construction for batch subtitle translation.
 *
 * This module provides:
 * - The system prompt template for JSON batch translation
 * - The request payload sent as the user message
 */

pub mod templates;

// Re-export main types
pub use templates::{BatchItem, BatchPrompt, BatchPromptBuilder, PromptTemplate};
