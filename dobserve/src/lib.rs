//! Observability hooks for deckwright tool dispatch and agent runs.
//!
//! ```rust
//! use dobserve::{
//!     CompositeHooks, MetricsObservabilityHooks, SafeAgentHooks, TracingObservabilityHooks,
//! };
//!
//! let _hooks = CompositeHooks::new()
//!     .with_agent_hooks(SafeAgentHooks::new(TracingObservabilityHooks))
//!     .with_agent_hooks(SafeAgentHooks::new(MetricsObservabilityHooks));
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{CompositeHooks, SafeAgentHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        CompositeHooks, MetricsObservabilityHooks, SafeAgentHooks, SafeToolHooks,
        TracingObservabilityHooks,
    };
}
