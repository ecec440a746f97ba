//! Fragment stream contracts and in-memory stream utilities.
//!
//! ```rust
//! use mprovider::{BoxedFragmentStream, VecFragmentStream};
//!
//! let stream = VecFragmentStream::new(vec![Ok("hello".to_string())]);
//! let _boxed: BoxedFragmentStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::ProviderError;

/// Completion fragment stream contract.
///
/// Invariants for consumers:
/// - Fragments are emitted in source order; arrival order is the only
///   ordering guarantee.
/// - A fragment is an opaque string chunk; zero-length fragments are legal
///   and carry no information.
/// - An `Err` item is terminal; no further items follow it.
/// - Once the stream yields `None`, it must not yield additional items.
pub trait FragmentStream: Stream<Item = Result<String, ProviderError>> + Send {}

impl<T> FragmentStream for T where T: Stream<Item = Result<String, ProviderError>> + Send {}

impl std::fmt::Debug for dyn FragmentStream + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FragmentStream")
    }
}

pub type BoxedFragmentStream<'a> = Pin<Box<dyn FragmentStream + 'a>>;

#[derive(Debug)]
pub struct VecFragmentStream {
    fragments: VecDeque<Result<String, ProviderError>>,
}

impl VecFragmentStream {
    pub fn new(fragments: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }
}

impl Stream for VecFragmentStream {
    type Item = Result<String, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<String, ProviderError>>> {
        Poll::Ready(self.fragments.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::VecFragmentStream;
    use crate::ProviderError;

    #[tokio::test]
    async fn vec_stream_yields_fragments_in_order_then_ends() {
        let mut stream = VecFragmentStream::new(vec![
            Ok("one".to_string()),
            Ok(String::new()),
            Ok("two".to_string()),
        ]);

        assert_eq!(stream.next().await, Some(Ok("one".to_string())));
        assert_eq!(stream.next().await, Some(Ok(String::new())));
        assert_eq!(stream.next().await, Some(Ok("two".to_string())));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn vec_stream_passes_through_terminal_error() {
        let mut stream = VecFragmentStream::new(vec![
            Ok("partial".to_string()),
            Err(ProviderError::transport("connection reset")),
        ]);

        assert_eq!(stream.next().await, Some(Ok("partial".to_string())));
        let error = stream
            .next()
            .await
            .expect("error item expected")
            .expect_err("item should be an error");
        assert_eq!(error.kind, crate::ProviderErrorKind::Transport);
    }
}
