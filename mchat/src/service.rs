//! Chat service orchestrating retrieval, generation, and citation decoding.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_timer::Delay;
use futures_util::StreamExt;
use futures_util::future::{Either, select};
use mprovider::{CompletionRequest, CompletionSource, Message, Role};
use mretrieve::{ContextDocument, DocumentStore, RetrieveError};

use crate::decode::{CitationDecoder, DecodeEvent};
use crate::{
    ChatError, ChatEvent, ChatEventStream, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
    ConversationStore, InMemoryConversationStore, NoopTurnHooks, PromptComposer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPolicy {
    /// Number of documents requested from the store per turn.
    pub retrieval_limit: usize,
    /// Deadline for the retrieval call; on expiry the turn proceeds with
    /// zero documents instead of failing.
    pub retrieval_timeout: Duration,
    /// Whether a partial answer is persisted when generation fails
    /// mid-stream. Cancellation (dropping the stream) never persists.
    pub persist_partial_on_error: bool,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            retrieval_limit: 3,
            retrieval_timeout: Duration::from_secs(5),
            persist_partial_on_error: true,
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn CompletionSource>,
    documents: Arc<dyn DocumentStore>,
    store: Arc<dyn ConversationStore>,
    hooks: Arc<dyn ChatTurnHooks>,
    composer: PromptComposer,
    policy: ChatPolicy,
}

pub struct ChatServiceBuilder {
    provider: Arc<dyn CompletionSource>,
    documents: Arc<dyn DocumentStore>,
    store: Option<Arc<dyn ConversationStore>>,
    hooks: Option<Arc<dyn ChatTurnHooks>>,
    composer: Option<PromptComposer>,
    policy: ChatPolicy,
}

impl ChatServiceBuilder {
    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatTurnHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn composer(mut self, composer: PromptComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> ChatService {
        ChatService {
            provider: self.provider,
            documents: self.documents,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new())),
            hooks: self.hooks.unwrap_or_else(|| Arc::new(NoopTurnHooks)),
            composer: self.composer.unwrap_or_default(),
            policy: self.policy,
        }
    }
}

impl ChatService {
    pub fn builder(
        provider: Arc<dyn CompletionSource>,
        documents: Arc<dyn DocumentStore>,
    ) -> ChatServiceBuilder {
        ChatServiceBuilder {
            provider,
            documents,
            store: None,
            hooks: None,
            composer: None,
            policy: ChatPolicy::default(),
        }
    }

    /// Runs one streamed chat turn.
    ///
    /// Event order: `Context` first, then decoded answer events as
    /// fragments arrive (never buffered a turn at a time), then either
    /// `TurnComplete` or a terminal error item. Dropping the returned
    /// stream cancels the turn; nothing is persisted in that case.
    pub fn stream_turn<'a>(
        &'a self,
        request: ChatTurnRequest,
    ) -> Result<ChatEventStream<'a>, ChatError> {
        if request.user_input.trim().is_empty() {
            return Err(ChatError::no_user_query(
                "turn request carries no user-authored message",
            ));
        }

        let events = stream! {
            let session = request.session.clone();
            self.hooks.on_turn_start(&session.id);

            let documents = match self.retrieve(&request.user_input).await {
                Ok(documents) => {
                    self.hooks.on_retrieval_complete(&session.id, documents.len());
                    documents
                }
                Err(error) => {
                    self.hooks.on_retrieval_degraded(&session.id, &error);
                    Vec::new()
                }
            };

            yield Ok(ChatEvent::Context(documents.clone()));

            let prior = match self.store.load_messages(&session.id).await {
                Ok(prior) => prior,
                Err(error) => {
                    self.hooks.on_turn_error(&session.id, &error);
                    yield Err(error);
                    return;
                }
            };

            let user_message = Message::new(Role::User, request.user_input.clone());
            let mut history = Vec::new();
            if let Some(system_prompt) = &session.system_prompt {
                history.push(Message::new(Role::System, system_prompt.clone()));
            }
            history.extend(prior);
            history.push(user_message.clone());

            let messages = self.composer.compose(&history, &documents);
            let mut completion_request =
                CompletionRequest::new(session.model.clone(), messages).enable_streaming();
            if let Some(temperature) = request.temperature {
                completion_request = completion_request.with_temperature(temperature);
            }
            if let Some(max_tokens) = request.max_tokens {
                completion_request = completion_request.with_max_tokens(max_tokens);
            }

            let mut fragments = match self.provider.stream(completion_request).await {
                Ok(fragments) => fragments,
                Err(error) => {
                    let error = ChatError::from(error);
                    self.hooks.on_turn_error(&session.id, &error);
                    yield Err(error);
                    return;
                }
            };

            let mut decoder = CitationDecoder::new(documents.len());
            let mut assistant_text = String::new();
            let mut failure = None::<ChatError>;

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        for event in decoder.feed(&fragment) {
                            accumulate(&mut assistant_text, &event);
                            yield Ok(chat_event(event));
                        }
                    }
                    Err(error) => {
                        failure = Some(ChatError::from(error));
                        break;
                    }
                }
            }

            // The end-of-stream flush runs on both outcomes: a residual the
            // decoder held back (a partial tag, an unterminated span) is
            // part of the answer whether generation finished or failed.
            for event in decoder.finish() {
                accumulate(&mut assistant_text, &event);
                yield Ok(chat_event(event));
            }

            if let Some(error) = failure {
                if self.policy.persist_partial_on_error && !assistant_text.is_empty() {
                    let partial = Message::new(Role::Assistant, assistant_text.clone());
                    if let Err(store_error) = self
                        .store
                        .append_messages(&session.id, vec![user_message, partial])
                        .await
                    {
                        self.hooks.on_turn_error(&session.id, &store_error);
                    }
                }

                self.hooks.on_turn_error(&session.id, &error);
                yield Err(error);
                return;
            }

            let assistant = Message::new(Role::Assistant, assistant_text.clone());
            if let Err(error) = self
                .store
                .append_messages(&session.id, vec![user_message, assistant])
                .await
            {
                self.hooks.on_turn_error(&session.id, &error);
                yield Err(error);
                return;
            }

            self.hooks
                .on_turn_complete(&session.id, assistant_text.chars().count());

            yield Ok(ChatEvent::TurnComplete(ChatTurnResult {
                session_id: session.id.clone(),
                assistant_message: assistant_text,
                documents_used: documents.len(),
            }));
        };

        Ok(Box::pin(events))
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<ContextDocument>, RetrieveError> {
        let search = self.documents.search(query, self.policy.retrieval_limit);
        let deadline = Delay::new(self.policy.retrieval_timeout);

        match select(search, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                Err(RetrieveError::timeout("document search deadline elapsed"))
            }
        }
    }
}

fn accumulate(assistant_text: &mut String, event: &DecodeEvent) {
    if let DecodeEvent::Text(text) | DecodeEvent::CitationText(text) = event {
        assistant_text.push_str(text);
    }
}

fn chat_event(event: DecodeEvent) -> ChatEvent {
    match event {
        DecodeEvent::Text(text) => ChatEvent::Delta(text),
        DecodeEvent::CitationStart(source_index) => ChatEvent::CitationStart { source_index },
        DecodeEvent::CitationText(text) => ChatEvent::CitationDelta(text),
        DecodeEvent::CitationEnd => ChatEvent::CitationEnd,
    }
}
