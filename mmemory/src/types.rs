//! Persistent session records.

use std::time::SystemTime;

use mcommon::{MetadataMap, SessionId};

/// One stored chat session. The transcript itself is stored separately
/// and addressed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub title: String,
    pub created_at: SystemTime,
    pub metadata: MetadataMap,
}

impl SessionRecord {
    pub fn new(id: impl Into<SessionId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: SystemTime::now(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: SystemTime) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
