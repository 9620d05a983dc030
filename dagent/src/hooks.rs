//! Lifecycle hooks for agent runs.
//!
//! ```rust
//! use dagent::{AgentRunHooks, NoopAgentRunHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn AgentRunHooks) {}
//!
//! assert_hooks_trait(&NoopAgentRunHooks);
//! ```

use std::time::Duration;

use dcommon::SessionId;

use crate::AgentError;

pub trait AgentRunHooks: Send + Sync {
    fn on_run_start(&self, _session_id: &SessionId) {}

    fn on_turn_start(&self, _session_id: &SessionId, _turn: u32) {}

    fn on_turn_complete(
        &self,
        _session_id: &SessionId,
        _turn: u32,
        _tool_calls: usize,
        _elapsed: Duration,
    ) {
    }

    fn on_run_complete(&self, _session_id: &SessionId, _turns: u32, _elapsed: Duration) {}

    /// `session_id` is `None` when the session itself could not be loaded.
    fn on_run_failure(
        &self,
        _session_id: Option<&SessionId>,
        _error: &AgentError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAgentRunHooks;

impl AgentRunHooks for NoopAgentRunHooks {}
