use std::panic::{AssertUnwindSafe, catch_unwind};

use mchat::{ChatError, ChatTurnHooks};
use mcommon::SessionId;
use mretrieve::RetrieveError;

/// Wrapper that keeps a panicking hook implementation from unwinding into
/// the chat turn that invoked it.
pub struct SafeTurnHooks<H> {
    inner: H,
}

impl<H> SafeTurnHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatTurnHooks for SafeTurnHooks<H>
where
    H: ChatTurnHooks,
{
    fn on_turn_start(&self, session_id: &SessionId) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_turn_start(session_id)));
    }

    fn on_retrieval_complete(&self, session_id: &SessionId, document_count: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_retrieval_complete(session_id, document_count)
        }));
    }

    fn on_retrieval_degraded(&self, session_id: &SessionId, error: &RetrieveError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_retrieval_degraded(session_id, error)
        }));
    }

    fn on_turn_complete(&self, session_id: &SessionId, answer_chars: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_complete(session_id, answer_chars)
        }));
    }

    fn on_turn_error(&self, session_id: &SessionId, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_error(session_id, error)
        }));
    }
}
