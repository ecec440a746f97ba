//! Session and transcript persistence layer with mchat adapter support.

mod adapter;
mod backend;
mod backends;
mod error;
mod types;

pub mod prelude {
    pub use crate::{
        InMemoryMemoryBackend, MemoryBackend, MemoryBackendConfig, MemoryConversationStore,
        MemoryError, MemoryErrorKind, SessionRecord, SqliteMemoryBackend,
        create_default_memory_backend, create_memory_backend,
    };
}

pub use adapter::MemoryConversationStore;
pub use backend::{
    InMemoryMemoryBackend, MemoryBackend, MemoryBackendConfig, SqliteMemoryBackend,
    create_default_memory_backend, create_memory_backend,
};
pub use error::{MemoryError, MemoryErrorKind};
pub use types::SessionRecord;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mchat::ConversationStore;
    use mcommon::SessionId;
    use mprovider::{Message, Role};

    use crate::{
        InMemoryMemoryBackend, MemoryBackend, MemoryConversationStore, SessionRecord,
        SqliteMemoryBackend,
    };

    #[tokio::test]
    async fn backend_stores_sessions_and_transcript() {
        let backend = InMemoryMemoryBackend::new();
        let session_id = SessionId::from("session-a");

        let created = backend
            .create_session_if_missing(SessionRecord::new(session_id.clone(), "First chat"))
            .await
            .expect("session should create");
        assert!(created);

        backend
            .append_transcript_messages(
                &session_id,
                vec![
                    Message::new(Role::User, "hello"),
                    Message::new(Role::Assistant, "hi"),
                ],
            )
            .await
            .expect("transcript should append");

        let record = backend
            .get_session(&session_id)
            .await
            .expect("lookup should work")
            .expect("session should exist");
        assert_eq!(record.title, "First chat");

        let transcript = backend
            .load_transcript_messages(&session_id)
            .await
            .expect("transcript should load");
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn create_session_if_missing_is_idempotent() {
        let backend = InMemoryMemoryBackend::new();
        let session_id = SessionId::from("session-init");

        let created = backend
            .create_session_if_missing(SessionRecord::new(session_id.clone(), "Original title"))
            .await
            .expect("first create should succeed");
        assert!(created);

        let created_again = backend
            .create_session_if_missing(SessionRecord::new(session_id.clone(), "Replacement"))
            .await
            .expect("second create should return false");
        assert!(!created_again);

        let record = backend
            .get_session(&session_id)
            .await
            .expect("lookup should work")
            .expect("session should exist");
        assert_eq!(record.title, "Original title");
    }

    #[tokio::test]
    async fn list_sessions_orders_by_creation_time() {
        let backend = InMemoryMemoryBackend::new();
        let earlier = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_000);
        let later = std::time::UNIX_EPOCH + std::time::Duration::from_secs(2_000);

        backend
            .create_session_if_missing(
                SessionRecord::new("session-late", "Later").with_created_at(later),
            )
            .await
            .expect("create should work");
        backend
            .create_session_if_missing(
                SessionRecord::new("session-early", "Earlier").with_created_at(earlier),
            )
            .await
            .expect("create should work");

        let sessions = backend.list_sessions().await.expect("list should work");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].title, "Earlier");
        assert_eq!(sessions[1].title, "Later");
    }

    #[tokio::test]
    async fn update_title_fails_for_unknown_session() {
        let backend = InMemoryMemoryBackend::new();
        let error = backend
            .update_session_title(&SessionId::from("missing"), "New title")
            .await
            .expect_err("update should fail");

        assert_eq!(error.kind, crate::MemoryErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_session_removes_record_and_transcript() {
        let backend = InMemoryMemoryBackend::new();
        let session_id = SessionId::from("session-delete");

        backend
            .create_session_if_missing(SessionRecord::new(session_id.clone(), "Doomed"))
            .await
            .expect("create should work");
        backend
            .append_transcript_messages(&session_id, vec![Message::new(Role::User, "hello")])
            .await
            .expect("append should work");

        assert!(
            backend
                .delete_session(&session_id)
                .await
                .expect("delete should work")
        );
        assert!(
            backend
                .get_session(&session_id)
                .await
                .expect("lookup should work")
                .is_none()
        );
        assert!(
            backend
                .load_transcript_messages(&session_id)
                .await
                .expect("load should work")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn conversation_store_adapter_reads_and_writes_transcript() {
        let backend: Arc<dyn MemoryBackend> = Arc::new(InMemoryMemoryBackend::new());
        let store = MemoryConversationStore::new(backend.clone());
        let session_id = SessionId::from("session-b");

        store
            .append_messages(
                &session_id,
                vec![
                    Message::new(Role::User, "hello"),
                    Message::new(Role::Assistant, "greetings"),
                ],
            )
            .await
            .expect("append should work");

        let loaded = store
            .load_messages(&session_id)
            .await
            .expect("load should work");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].role, Role::User);
        assert_eq!(loaded[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn sqlite_backend_stores_sessions_and_transcript() {
        let backend =
            SqliteMemoryBackend::new_in_memory().expect("sqlite backend should initialize");
        let session_id = SessionId::from("session-sqlite");

        let created = backend
            .create_session_if_missing(
                SessionRecord::new(session_id.clone(), "Sqlite chat")
                    .with_metadata("origin", "test"),
            )
            .await
            .expect("session should create");
        assert!(created);

        backend
            .append_transcript_messages(
                &session_id,
                vec![
                    Message::new(Role::User, "sqlite hello"),
                    Message::new(Role::Assistant, "sqlite hi"),
                ],
            )
            .await
            .expect("transcript should append");

        let record = backend
            .get_session(&session_id)
            .await
            .expect("lookup should work")
            .expect("session should exist");
        assert_eq!(record.title, "Sqlite chat");
        assert_eq!(record.metadata.get("origin").map(String::as_str), Some("test"));

        let transcript = backend
            .load_transcript_messages(&session_id)
            .await
            .expect("transcript should load");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn sqlite_backend_round_trips_session_timestamps() {
        let backend =
            SqliteMemoryBackend::new_in_memory().expect("sqlite backend should initialize");
        let created_at = std::time::UNIX_EPOCH + std::time::Duration::new(1_700_000_000, 250);

        backend
            .create_session_if_missing(
                SessionRecord::new("session-times", "Timestamps").with_created_at(created_at),
            )
            .await
            .expect("session should create");

        let record = backend
            .get_session(&SessionId::from("session-times"))
            .await
            .expect("lookup should work")
            .expect("session should exist");
        assert_eq!(record.created_at, created_at);
    }
}
