//! Memory backend trait and in-memory backend implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mcommon::{BoxFuture, SessionId};
use mprovider::Message;

use crate::backends::sqlite::default_sqlite_path;
use crate::error::MemoryError;
use crate::types::SessionRecord;

pub use crate::backends::sqlite::SqliteMemoryBackend;

pub trait MemoryBackend: Send + Sync {
    /// Creates the session if no record with its ID exists yet. Returns
    /// whether a record was created; an existing record is left untouched.
    fn create_session_if_missing<'a>(
        &'a self,
        record: SessionRecord,
    ) -> BoxFuture<'a, Result<bool, MemoryError>>;

    fn get_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, MemoryError>>;

    /// All stored sessions, oldest first.
    fn list_sessions<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionRecord>, MemoryError>>;

    fn update_session_title<'a>(
        &'a self,
        session_id: &'a SessionId,
        title: &'a str,
    ) -> BoxFuture<'a, Result<(), MemoryError>>;

    /// Removes the session record and its transcript. Returns whether a
    /// record existed.
    fn delete_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<bool, MemoryError>>;

    fn load_transcript_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Message>, MemoryError>>;

    fn append_transcript_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
        messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<(), MemoryError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryBackendConfig {
    Sqlite { path: PathBuf },
    InMemory,
}

impl Default for MemoryBackendConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_memory_backend(
    config: MemoryBackendConfig,
) -> Result<Arc<dyn MemoryBackend>, MemoryError> {
    match config {
        MemoryBackendConfig::Sqlite { path } => Ok(Arc::new(SqliteMemoryBackend::new(path)?)),
        MemoryBackendConfig::InMemory => Ok(Arc::new(InMemoryMemoryBackend::new())),
    }
}

pub fn create_default_memory_backend() -> Result<Arc<dyn MemoryBackend>, MemoryError> {
    create_memory_backend(MemoryBackendConfig::default())
}

#[derive(Debug, Default)]
pub struct InMemoryMemoryBackend {
    sessions: Mutex<HashMap<SessionId, SessionState>>,
}

#[derive(Debug, Default, Clone)]
struct SessionState {
    record: Option<SessionRecord>,
    transcript: Vec<Message>,
}

impl InMemoryMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryBackend for InMemoryMemoryBackend {
    fn create_session_if_missing<'a>(
        &'a self,
        record: SessionRecord,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            let state = sessions.entry(record.id.clone()).or_default();
            if state.record.is_some() {
                return Ok(false);
            }

            state.record = Some(record);
            Ok(true)
        })
    }

    fn get_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, MemoryError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            Ok(sessions
                .get(session_id)
                .and_then(|state| state.record.clone()))
        })
    }

    fn list_sessions<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionRecord>, MemoryError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            let mut records = sessions
                .values()
                .filter_map(|state| state.record.clone())
                .collect::<Vec<_>>();

            records.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.as_str().cmp(b.id.as_str()))
            });

            Ok(records)
        })
    }

    fn update_session_title<'a>(
        &'a self,
        session_id: &'a SessionId,
        title: &'a str,
    ) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            if let Some(record) = sessions
                .get_mut(session_id)
                .and_then(|state| state.record.as_mut())
            {
                record.title = title.to_string();
                return Ok(());
            }

            Err(MemoryError::not_found(format!(
                "session '{session_id}' not found"
            )))
        })
    }

    fn delete_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            Ok(sessions
                .remove(session_id)
                .is_some_and(|state| state.record.is_some()))
        })
    }

    fn load_transcript_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Message>, MemoryError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            Ok(sessions
                .get(session_id)
                .map(|state| state.transcript.clone())
                .unwrap_or_default())
        })
    }

    fn append_transcript_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
        messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory backend lock poisoned"))?;

            sessions
                .entry(session_id.clone())
                .or_default()
                .transcript
                .extend(messages);

            Ok(())
        })
    }
}
