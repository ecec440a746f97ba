//! Conversation storage contracts and a basic in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use mcommon::{BoxFuture, SessionId};
use mprovider::Message;

use crate::ChatError;

pub trait ConversationStore: Send + Sync {
    fn load_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>>;

    /// Appends messages atomically with respect to other appends for the
    /// same session; concurrent turns in one session must not interleave
    /// within a single call.
    fn append_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
        messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<(), ChatError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: Mutex<HashMap<SessionId, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn load_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| ChatError::store("conversation store lock poisoned"))?;

            Ok(sessions.get(session_id).cloned().unwrap_or_default())
        })
    }

    fn append_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
        messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| ChatError::store("conversation store lock poisoned"))?;

            sessions
                .entry(session_id.clone())
                .or_default()
                .extend(messages);

            Ok(())
        })
    }
}
