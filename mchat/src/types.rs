//! Chat session, turn, and chat event types.

use std::pin::Pin;

use futures_core::Stream;
use mcommon::SessionId;
use mretrieve::ContextDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: SessionId,
    pub model: String,
    pub system_prompt: Option<String>,
}

impl ChatSession {
    pub fn new(id: impl Into<SessionId>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurnRequest {
    pub session: ChatSession,
    pub user_input: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatTurnRequest {
    pub fn new(session: ChatSession, user_input: impl Into<String>) -> Self {
        Self {
            session,
            user_input: user_input.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnResult {
    pub session_id: SessionId,
    pub assistant_message: String,
    pub documents_used: usize,
}

/// One typed event of a streamed chat turn.
///
/// Invariants for consumers:
/// - Events arrive in emission order and are never reordered.
/// - `Context` appears exactly once, before any other event.
/// - `CitationStart` and `CitationEnd` are strictly paired and non-nested;
///   a stream that ends mid-span leaves at most one `CitationStart`
///   unmatched.
/// - Concatenating `Delta` and `CitationDelta` payloads in order yields
///   the visible answer with citation markup stripped.
/// - `TurnComplete` is terminal when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Context(Vec<ContextDocument>),
    Delta(String),
    CitationStart { source_index: usize },
    CitationDelta(String),
    CitationEnd,
    TurnComplete(ChatTurnResult),
}

pub type ChatEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatEvent, crate::ChatError>> + Send + 'a>>;
