use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mcommon::{BoxFuture, MetadataMap, SessionId};
use mprovider::{Message, Role};
use rusqlite::{Connection, OptionalExtension, params};

use crate::backend::MemoryBackend;
use crate::error::MemoryError;
use crate::types::SessionRecord;

#[derive(Debug)]
pub struct SqliteMemoryBackend {
    connection: Mutex<Connection>,
}

impl SqliteMemoryBackend {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                MemoryError::storage(format!(
                    "failed to create sqlite parent directory: {error}"
                ))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            MemoryError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, MemoryError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            MemoryError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, MemoryError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                MemoryError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let backend = Self {
            connection: Mutex::new(connection),
        };
        backend.initialize_schema()?;
        Ok(backend)
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, MemoryError> {
        self.connection
            .lock()
            .map_err(|_| MemoryError::storage("sqlite backend lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), MemoryError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL,
                metadata_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS transcript_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transcript_session_id
            ON transcript_messages(session_id, id);
            ",
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }

    fn record_from_row(
        session_id: SessionId,
        title: String,
        created_at_secs: i64,
        created_at_nanos: i64,
        metadata_json: String,
    ) -> Result<SessionRecord, MemoryError> {
        let metadata: MetadataMap = serde_json::from_str(&metadata_json).map_err(|error| {
            MemoryError::storage(format!("failed to decode session metadata JSON: {error}"))
        })?;

        Ok(SessionRecord {
            id: session_id,
            title,
            created_at: decode_system_time(created_at_secs, created_at_nanos)?,
            metadata,
        })
    }
}

impl MemoryBackend for SqliteMemoryBackend {
    fn create_session_if_missing<'a>(
        &'a self,
        record: SessionRecord,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let (created_at_secs, created_at_nanos) = encode_system_time(record.created_at)?;
            let metadata_json = serde_json::to_string(&record.metadata).map_err(|error| {
                MemoryError::storage(format!("failed to serialize session metadata: {error}"))
            })?;

            let inserted = conn
                .execute(
                    "
                    INSERT OR IGNORE INTO sessions (
                        session_id,
                        title,
                        created_at_secs,
                        created_at_nanos,
                        metadata_json
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ",
                    params![
                        record.id.as_str(),
                        &record.title,
                        created_at_secs,
                        created_at_nanos,
                        metadata_json,
                    ],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to create session row: {error}"))
                })?;

            Ok(inserted > 0)
        })
    }

    fn get_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<SessionRecord>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let row = conn
                .query_row(
                    "
                    SELECT title, created_at_secs, created_at_nanos, metadata_json
                    FROM sessions
                    WHERE session_id = ?1
                    ",
                    params![session_id.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(|error| {
                    MemoryError::storage(format!("failed to load session row: {error}"))
                })?;

            row.map(|(title, secs, nanos, metadata_json)| {
                Self::record_from_row(session_id.clone(), title, secs, nanos, metadata_json)
            })
            .transpose()
        })
    }

    fn list_sessions<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionRecord>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT session_id, title, created_at_secs, created_at_nanos, metadata_json
                    FROM sessions
                    ORDER BY created_at_secs ASC, created_at_nanos ASC, session_id ASC
                    ",
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to prepare session list query: {error}"))
                })?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                })
                .map_err(|error| {
                    MemoryError::storage(format!("failed to query session rows: {error}"))
                })?;

            let mut records = Vec::new();
            for row in rows {
                let (session_id, title, secs, nanos, metadata_json) = row.map_err(|error| {
                    MemoryError::storage(format!("failed to read session row: {error}"))
                })?;
                records.push(Self::record_from_row(
                    SessionId::from(session_id),
                    title,
                    secs,
                    nanos,
                    metadata_json,
                )?);
            }
            Ok(records)
        })
    }

    fn update_session_title<'a>(
        &'a self,
        session_id: &'a SessionId,
        title: &'a str,
    ) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let updated = conn
                .execute(
                    "UPDATE sessions SET title = ?1 WHERE session_id = ?2",
                    params![title, session_id.as_str()],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to update session title: {error}"))
                })?;

            if updated == 0 {
                return Err(MemoryError::not_found(format!(
                    "session '{session_id}' not found"
                )));
            }
            Ok(())
        })
    }

    fn delete_session<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<bool, MemoryError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                MemoryError::storage(format!("failed to open delete transaction: {error}"))
            })?;
            tx.execute(
                "DELETE FROM transcript_messages WHERE session_id = ?1",
                params![session_id.as_str()],
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to delete transcript rows: {error}"))
            })?;

            let deleted = tx
                .execute(
                    "DELETE FROM sessions WHERE session_id = ?1",
                    params![session_id.as_str()],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to delete session row: {error}"))
                })?;
            tx.commit().map_err(|error| {
                MemoryError::storage(format!("failed to commit delete transaction: {error}"))
            })?;

            Ok(deleted > 0)
        })
    }

    fn load_transcript_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Message>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT role, content
                    FROM transcript_messages
                    WHERE session_id = ?1
                    ORDER BY id ASC
                    ",
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to prepare transcript query: {error}"))
                })?;
            let rows = stmt
                .query_map(params![session_id.as_str()], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(|error| {
                    MemoryError::storage(format!("failed to query transcript rows: {error}"))
                })?;
            let mut messages = Vec::new();
            for row in rows {
                let (role, content) = row.map_err(|error| {
                    MemoryError::storage(format!("failed to read transcript row: {error}"))
                })?;
                messages.push(Message {
                    role: role_from_str(&role)?,
                    content,
                });
            }
            Ok(messages)
        })
    }

    fn append_transcript_messages<'a>(
        &'a self,
        session_id: &'a SessionId,
        messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            // One transaction per call: either every message lands or none
            // does, so a user message is never persisted without its
            // assistant counterpart.
            let tx = conn.transaction().map_err(|error| {
                MemoryError::storage(format!("failed to open transcript transaction: {error}"))
            })?;
            for message in messages {
                tx.execute(
                    "
                    INSERT INTO transcript_messages (session_id, role, content)
                    VALUES (?1, ?2, ?3)
                    ",
                    params![
                        session_id.as_str(),
                        role_to_str(message.role),
                        message.content
                    ],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to append transcript message: {error}"))
                })?;
            }
            tx.commit().map_err(|error| {
                MemoryError::storage(format!("failed to commit transcript transaction: {error}"))
            })?;
            Ok(())
        })
    }
}

fn encode_system_time(value: SystemTime) -> Result<(i64, i64), MemoryError> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        MemoryError::invalid_request(format!("timestamp predates unix epoch: {error}"))
    })?;
    Ok((
        duration.as_secs() as i64,
        i64::from(duration.subsec_nanos()),
    ))
}

fn decode_system_time(seconds: i64, nanos: i64) -> Result<SystemTime, MemoryError> {
    if seconds < 0 {
        return Err(MemoryError::storage(format!(
            "timestamp seconds must be non-negative, got {seconds}"
        )));
    }
    if !(0..1_000_000_000).contains(&nanos) {
        return Err(MemoryError::storage(format!(
            "timestamp nanos must be in [0, 1_000_000_000), got {nanos}"
        )));
    }
    Ok(UNIX_EPOCH + Duration::new(seconds as u64, nanos as u32))
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn role_from_str(value: &str) -> Result<Role, MemoryError> {
    match value {
        "system" => Ok(Role::System),
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        _ => Err(MemoryError::storage(format!(
            "unknown transcript role value '{value}'"
        ))),
    }
}

pub(crate) fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("MMEMORY_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home)
            .join(".marginalia")
            .join("mmemory.sqlite3");
    }

    PathBuf::from("mmemory.sqlite3")
}
