//! Tracing-based hooks for chat turn milestones.
//!
//! ```rust
//! use mchat::ChatTurnHooks;
//! use mobserve::TracingTurnHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn ChatTurnHooks) {}
//!
//! let hooks = TracingTurnHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use mchat::{ChatError, ChatTurnHooks};
use mcommon::SessionId;
use mretrieve::RetrieveError;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTurnHooks;

impl ChatTurnHooks for TracingTurnHooks {
    fn on_turn_start(&self, session_id: &SessionId) {
        tracing::info!(
            phase = "chat",
            event = "turn_start",
            session_id = %session_id
        );
    }

    fn on_retrieval_complete(&self, session_id: &SessionId, document_count: usize) {
        tracing::info!(
            phase = "retrieval",
            event = "complete",
            session_id = %session_id,
            document_count
        );
    }

    fn on_retrieval_degraded(&self, session_id: &SessionId, error: &RetrieveError) {
        tracing::warn!(
            phase = "retrieval",
            event = "degraded",
            session_id = %session_id,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, answer_chars: usize) {
        tracing::info!(
            phase = "chat",
            event = "turn_complete",
            session_id = %session_id,
            answer_chars
        );
    }

    fn on_turn_error(&self, session_id: &SessionId, error: &ChatError) {
        tracing::error!(
            phase = "chat",
            event = "turn_error",
            session_id = %session_id,
            error_kind = ?error.kind,
            category = error.category(),
            error = %error
        );
    }
}
