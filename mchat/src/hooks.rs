//! Turn-lifecycle observation seam.

use mcommon::SessionId;
use mretrieve::RetrieveError;

use crate::ChatError;

/// Callbacks invoked by the chat service at turn milestones. All methods
/// default to no-ops so implementations can observe only what they need.
/// Implementations must be cheap and must not block.
pub trait ChatTurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId) {}

    fn on_retrieval_complete(&self, _session_id: &SessionId, _document_count: usize) {}

    /// Retrieval failed or timed out and the turn proceeds with zero
    /// documents. Degradation, not an error.
    fn on_retrieval_degraded(&self, _session_id: &SessionId, _error: &RetrieveError) {}

    fn on_turn_complete(&self, _session_id: &SessionId, _answer_chars: usize) {}

    fn on_turn_error(&self, _session_id: &SessionId, _error: &ChatError) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTurnHooks;

impl ChatTurnHooks for NoopTurnHooks {}
