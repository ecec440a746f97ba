//! Metrics-based hooks for chat turn milestones.
//!
//! ```rust
//! use mchat::ChatTurnHooks;
//! use mobserve::MetricsTurnHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn ChatTurnHooks) {}
//!
//! let hooks = MetricsTurnHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use mchat::{ChatError, ChatTurnHooks};
use mcommon::SessionId;
use mretrieve::RetrieveError;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTurnHooks;

impl ChatTurnHooks for MetricsTurnHooks {
    fn on_turn_start(&self, _session_id: &SessionId) {
        metrics::counter!("marginalia_turn_start_total").increment(1);
    }

    fn on_retrieval_complete(&self, _session_id: &SessionId, document_count: usize) {
        metrics::counter!("marginalia_retrieval_complete_total").increment(1);
        metrics::histogram!("marginalia_retrieval_documents_per_turn")
            .record(document_count as f64);
    }

    fn on_retrieval_degraded(&self, _session_id: &SessionId, error: &RetrieveError) {
        metrics::counter!(
            "marginalia_retrieval_degraded_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_turn_complete(&self, _session_id: &SessionId, answer_chars: usize) {
        metrics::counter!("marginalia_turn_complete_total").increment(1);
        metrics::histogram!("marginalia_turn_answer_chars").record(answer_chars as f64);
    }

    fn on_turn_error(&self, _session_id: &SessionId, error: &ChatError) {
        metrics::counter!(
            "marginalia_turn_error_total",
            "category" => error.category()
        )
        .increment(1);
    }
}
