//! Runtime wiring helpers for chat usage.

use std::sync::Arc;

use crate::{
    ChatService, ChatTurnHooks, CompletionSource, DocumentStore, InMemoryMemoryBackend,
    MemoryBackend, MemoryConversationStore, SafeTurnHooks, TracingTurnHooks,
};

#[derive(Clone)]
pub struct RuntimeBundle {
    pub memory: Arc<dyn MemoryBackend>,
    pub chat: ChatService,
}

pub fn in_memory_backend() -> Arc<dyn MemoryBackend> {
    Arc::new(InMemoryMemoryBackend::new())
}

/// Panic-isolated tracing hooks, suitable as a production default.
pub fn default_hooks() -> Arc<dyn ChatTurnHooks> {
    Arc::new(SafeTurnHooks::new(TracingTurnHooks))
}

pub fn chat_service(
    provider: Arc<dyn CompletionSource>,
    documents: Arc<dyn DocumentStore>,
) -> ChatService {
    ChatService::builder(provider, documents).build()
}

pub fn build_runtime(
    provider: Arc<dyn CompletionSource>,
    documents: Arc<dyn DocumentStore>,
) -> RuntimeBundle {
    build_runtime_with(provider, documents, in_memory_backend(), default_hooks())
}

pub fn build_runtime_with_memory(
    provider: Arc<dyn CompletionSource>,
    documents: Arc<dyn DocumentStore>,
    memory: Arc<dyn MemoryBackend>,
) -> RuntimeBundle {
    build_runtime_with(provider, documents, memory, default_hooks())
}

pub fn build_runtime_with(
    provider: Arc<dyn CompletionSource>,
    documents: Arc<dyn DocumentStore>,
    memory: Arc<dyn MemoryBackend>,
    hooks: Arc<dyn ChatTurnHooks>,
) -> RuntimeBundle {
    let store = Arc::new(MemoryConversationStore::new(Arc::clone(&memory)));

    let chat = ChatService::builder(provider, documents)
        .store(store)
        .hooks(hooks)
        .build();

    RuntimeBundle { memory, chat }
}
