//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use mcommon::{MetadataMap, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("source".to_string(), "handbook.pdf".to_string());
//!
//! assert_eq!(session.as_str(), "session-1");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use mcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use mcommon::{MetadataMap, SessionId};
    //!
    //! let session = SessionId::new("session-42");
    //! let mut metadata = MetadataMap::new();
    //! metadata.insert("page".to_string(), "12".to_string());
    //!
    //! assert_eq!(session.to_string(), "session-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub use context::{MetadataMap, SessionId};
pub use future::BoxFuture;
