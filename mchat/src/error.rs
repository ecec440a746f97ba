//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    NoUserQuery,
    InvalidRequest,
    Provider,
    Retrieval,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_user_query(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::NoUserQuery, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Retrieval, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    /// Coarse category for the transport error frame. Deliberately not the
    /// internal message: callers see a stable classification, logs see the
    /// detail.
    pub fn category(&self) -> &'static str {
        match self.kind {
            ChatErrorKind::NoUserQuery => "no_user_query",
            ChatErrorKind::InvalidRequest => "invalid_request",
            ChatErrorKind::Provider => "generation_failure",
            ChatErrorKind::Retrieval => "retrieval_failure",
            ChatErrorKind::Store => "storage_failure",
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<mprovider::ProviderError> for ChatError {
    fn from(value: mprovider::ProviderError) -> Self {
        ChatError::provider(value.to_string())
    }
}

impl From<mretrieve::RetrieveError> for ChatError {
    fn from(value: mretrieve::RetrieveError) -> Self {
        ChatError::retrieval(value.to_string())
    }
}
