//! Tracing-based observability hooks for tool dispatch and agent runs.
//!
//! ```rust
//! use dagent::AgentRunHooks;
//! use dobserve::TracingObservabilityHooks;
//!
//! fn accepts_run_hooks(_hooks: &dyn AgentRunHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_run_hooks(&hooks);
//! ```

use std::time::Duration;

use dagent::{AgentError, AgentRunHooks};
use dcommon::SessionId;
use dprovider::ToolCall;
use dtooling::{ToolContext, ToolError, ToolRuntimeHooks};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolContext<'_>) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id(),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolContext<'_>,
        _output: &Value,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id(),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolContext<'_>,
        error: &ToolError,
        elapsed: Duration,
    ) {
        // Tool faults are relayed to the model, so they are warnings rather than errors.
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id(),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl AgentRunHooks for TracingObservabilityHooks {
    fn on_run_start(&self, session_id: &SessionId) {
        tracing::info!(phase = "agent", event = "run_start", session_id = %session_id);
    }

    fn on_turn_start(&self, session_id: &SessionId, turn: u32) {
        tracing::debug!(
            phase = "agent",
            event = "turn_start",
            session_id = %session_id,
            turn
        );
    }

    fn on_turn_complete(
        &self,
        session_id: &SessionId,
        turn: u32,
        tool_calls: usize,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "agent",
            event = "turn_complete",
            session_id = %session_id,
            turn,
            tool_calls,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_run_complete(&self, session_id: &SessionId, turns: u32, elapsed: Duration) {
        tracing::info!(
            phase = "agent",
            event = "run_complete",
            session_id = %session_id,
            turns,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_run_failure(&self, session_id: Option<&SessionId>, error: &AgentError, elapsed: Duration) {
        tracing::error!(
            phase = "agent",
            event = "run_failure",
            session_id = session_id.map(SessionId::as_str),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = error.kind.as_str(),
            error = %error
        );
    }
}
