//! Unified facade over the marginalia workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core marginalia crates and provides convenience
//! utilities and macros for common setup and request-building flows.

mod macros;

pub mod prelude;
pub mod providers;
pub mod runtime;
pub mod util;

pub use mchat;
pub use mcommon;
pub use mmemory;
pub use mobserve;
pub use mprovider;
pub use mretrieve;

pub use mchat::{
    ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatPolicy, ChatService,
    ChatServiceBuilder, ChatSession, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
    CitationDecoder, ConversationStore, DEFAULT_INSTRUCTIONS, DecodeEvent,
    InMemoryConversationStore, NoopTurnHooks, PromptComposer, SseEventSink,
};
pub use mcommon::{BoxFuture, MetadataMap, SessionId};
pub use mmemory::{
    InMemoryMemoryBackend, MemoryBackend, MemoryBackendConfig, MemoryConversationStore,
    MemoryError, MemoryErrorKind, SessionRecord, SqliteMemoryBackend,
    create_default_memory_backend, create_memory_backend,
};
pub use mobserve::{MetricsTurnHooks, SafeTurnHooks, TracingTurnHooks};
pub use mprovider::{
    BoxedFragmentStream, ChatCompletionsTransport, CompletionRequest, CompletionSource,
    FragmentStream, HttpChatTransport, Message, OPENAI_BASE_URL, OpenAiCompatProvider,
    ProviderError, ProviderErrorKind, ProviderFuture, Role, VecFragmentStream,
};
pub use mretrieve::{
    ContextDocument, DocumentStore, HttpDocumentStore, InMemoryDocumentStore, RetrieveError,
    RetrieveErrorKind,
};

pub use providers::{
    ProviderBuildConfig, build_provider_from_api_key, build_provider_with_config,
};
pub use runtime::{
    RuntimeBundle, build_runtime, build_runtime_with, build_runtime_with_memory, chat_service,
    default_hooks, in_memory_backend,
};
pub use util::{assistant_message, session, system_message, turn, user_message};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn mg_msg_macro_creates_expected_message() {
        let message = crate::mg_msg!(user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn mg_messages_macro_builds_message_vector() {
        let messages = crate::mg_messages![
            system => "You are concise.",
            user => "Summarize the handbook",
        ];

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn mg_session_macro_supports_optional_system_prompt() {
        let bare = crate::mg_session!("session-1", "gpt-4o-mini");
        assert!(bare.system_prompt.is_none());

        let prompted = crate::mg_session!("session-1", "gpt-4o-mini", "Be concise.");
        assert_eq!(prompted.system_prompt.as_deref(), Some("Be concise."));
    }
}
