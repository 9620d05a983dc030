//! Metrics-based observability hooks for tool dispatch and agent runs.
//!
//! ```rust
//! use dobserve::MetricsObservabilityHooks;
//! use dtooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use dagent::{AgentError, AgentRunHooks};
use dcommon::SessionId;
use dprovider::ToolCall;
use dtooling::{ToolContext, ToolError, ToolRuntimeHooks};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolContext<'_>) {
        metrics::counter!(
            "deckwright_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolContext<'_>,
        _output: &Value,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "deckwright_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "deckwright_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolContext<'_>,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "deckwright_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "deckwright_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl AgentRunHooks for MetricsObservabilityHooks {
    fn on_run_start(&self, _session_id: &SessionId) {
        metrics::counter!("deckwright_agent_run_start_total").increment(1);
    }

    fn on_turn_start(&self, _session_id: &SessionId, _turn: u32) {
        metrics::counter!("deckwright_agent_turn_start_total").increment(1);
    }

    fn on_turn_complete(
        &self,
        _session_id: &SessionId,
        _turn: u32,
        tool_calls: usize,
        elapsed: Duration,
    ) {
        metrics::counter!("deckwright_agent_turn_complete_total").increment(1);
        metrics::histogram!("deckwright_agent_tool_calls_per_turn").record(tool_calls as f64);
        metrics::histogram!("deckwright_agent_turn_duration_seconds").record(elapsed.as_secs_f64());
    }

    fn on_run_complete(&self, _session_id: &SessionId, turns: u32, elapsed: Duration) {
        metrics::counter!("deckwright_agent_run_success_total").increment(1);
        metrics::histogram!("deckwright_agent_turns_per_run").record(turns as f64);
        metrics::histogram!(
            "deckwright_agent_run_duration_seconds",
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_run_failure(&self, _session_id: Option<&SessionId>, error: &AgentError, elapsed: Duration) {
        metrics::counter!(
            "deckwright_agent_run_failure_total",
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "deckwright_agent_run_duration_seconds",
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
