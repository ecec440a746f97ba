//! System-prompt assembly for citation-grounded turns.

use std::path::Path;

use mprovider::{Message, Role};
use mretrieve::ContextDocument;

/// Instructions used when no instruction file is configured or readable.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant. Answer using the \
    reference sources when they are relevant, and wrap text supported by a source in \
    <citation source_id=\"N\">...</citation> markup, where N is the source's ID.";

/// Builds the full message list handed to the completion source.
///
/// Pure over its inputs; the base instruction text is loaded once at
/// construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    base_instructions: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            base_instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self {
            base_instructions: instructions.into(),
        }
    }

    /// Loads instructions from a file, falling back to
    /// [`DEFAULT_INSTRUCTIONS`] when the file cannot be read. A missing
    /// instruction file must not fail chat turns.
    pub fn from_instruction_file(path: impl AsRef<Path>) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => Self::with_instructions(text.trim()),
            _ => Self::default(),
        }
    }

    pub fn base_instructions(&self) -> &str {
        &self.base_instructions
    }

    /// Prepends the instruction message, with retrieved documents listed
    /// as numbered sources, to `history`. A document's list position is
    /// its source ID.
    pub fn compose(
        &self,
        history: &[Message],
        documents: &[ContextDocument],
    ) -> Vec<Message> {
        let mut system_content = self.base_instructions.clone();

        if !documents.is_empty() {
            system_content.push_str("\n\nReference sources:");
            for (index, document) in documents.iter().enumerate() {
                system_content.push_str(&format!(
                    "\n\nSource ID: {index}\nContent: {}",
                    document.content
                ));
            }
        }

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::new(Role::System, system_content));
        messages.extend(history.iter().cloned());
        messages
    }
}
