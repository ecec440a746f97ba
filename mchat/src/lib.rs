//! Citation-aware conversational orchestration over model providers.
//!
//! The centerpiece is [`CitationDecoder`], an incremental decoder that
//! turns provider text fragments containing
//! `<citation source_id="N">...</citation>` markup into typed events, no
//! matter how the markup is split across fragment boundaries.

mod compose;
mod decode;
mod error;
mod hooks;
mod service;
mod sink;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatPolicy, ChatService,
        ChatServiceBuilder, ChatSession, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
        CitationDecoder, ConversationStore, DecodeEvent, InMemoryConversationStore,
        NoopTurnHooks, PromptComposer, SseEventSink,
    };
    pub use mcommon::{MetadataMap, SessionId};
}

pub use compose::{DEFAULT_INSTRUCTIONS, PromptComposer};
pub use decode::{CitationDecoder, DecodeEvent};
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ChatTurnHooks, NoopTurnHooks};
pub use service::{ChatPolicy, ChatService, ChatServiceBuilder};
pub use sink::SseEventSink;
pub use store::{ConversationStore, InMemoryConversationStore};
pub use types::{ChatEvent, ChatEventStream, ChatSession, ChatTurnRequest, ChatTurnResult};
pub use mcommon::{MetadataMap, SessionId};
