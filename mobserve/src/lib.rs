//! Production-friendly observability hooks for chat turn milestones.
//!
//! ```rust
//! use mobserve::{MetricsTurnHooks, SafeTurnHooks, TracingTurnHooks};
//!
//! let _hooks = SafeTurnHooks::new(TracingTurnHooks);
//! let _metrics = MetricsTurnHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsTurnHooks;
pub use safe_hooks::SafeTurnHooks;
pub use tracing_hooks::TracingTurnHooks;

pub mod prelude {
    pub use crate::{MetricsTurnHooks, SafeTurnHooks, TracingTurnHooks};
}
