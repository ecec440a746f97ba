//! Document retrieval contracts for citation-grounded chat turns.
//!
//! A [`DocumentStore`] maps a query to an ordered list of context
//! documents. The order is semantically meaningful: a document's position
//! in the result list is the `source_id` the generated answer cites.

mod http;
mod memory;

pub use http::HttpDocumentStore;
pub use memory::InMemoryDocumentStore;

use std::error::Error;
use std::fmt::{Display, Formatter};

use mcommon::{BoxFuture, MetadataMap};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextDocument {
    pub content: String,
    pub metadata: MetadataMap,
}

impl ContextDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Retrieval contract, called once per chat turn before decoding starts.
///
/// Implementations must return at most `limit` documents, best match
/// first. An empty result is a valid answer, not an error.
pub trait DocumentStore: Send + Sync {
    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ContextDocument>, RetrieveError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveErrorKind {
    Timeout,
    Transport,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveError {
    pub kind: RetrieveErrorKind,
    pub message: String,
}

impl RetrieveError {
    pub fn new(kind: RetrieveErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RetrieveErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RetrieveErrorKind::Transport, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RetrieveErrorKind::Other, message)
    }
}

impl Display for RetrieveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for RetrieveError {}
