//! Common imports for most marginalia applications.

pub use crate::{
    assistant_message, build_runtime, build_runtime_with, build_runtime_with_memory, chat_service,
    default_hooks, in_memory_backend, session, system_message, turn, user_message,
};
pub use crate::{
    build_provider_from_api_key, build_provider_with_config, ProviderBuildConfig,
};
pub use crate::{mg_messages, mg_msg, mg_session};
pub use crate::{
    BoxFuture, ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatPolicy, ChatService,
    ChatServiceBuilder, ChatSession, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
    CitationDecoder, CompletionSource, ContextDocument, ConversationStore, DecodeEvent,
    DocumentStore, HttpDocumentStore, InMemoryConversationStore, InMemoryDocumentStore,
    InMemoryMemoryBackend, MemoryBackend, MemoryConversationStore, Message, MetricsTurnHooks,
    OpenAiCompatProvider, PromptComposer, ProviderError, ProviderErrorKind, Role, RuntimeBundle,
    SafeTurnHooks, SessionId, SessionRecord, SqliteMemoryBackend, SseEventSink, TracingTurnHooks,
};
