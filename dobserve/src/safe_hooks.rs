//! Wrappers that keep a panicking hook from taking a run down with it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use dagent::{AgentError, AgentRunHooks};
use dcommon::SessionId;
use dprovider::ToolCall;
use dtooling::{ToolContext, ToolError, ToolRuntimeHooks};
use serde_json::Value;

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolContext<'_>) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolContext<'_>,
        output: &Value,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, output, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolContext<'_>,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}

pub struct SafeAgentHooks<H> {
    inner: H,
}

impl<H> SafeAgentHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> AgentRunHooks for SafeAgentHooks<H>
where
    H: AgentRunHooks,
{
    fn on_run_start(&self, session_id: &SessionId) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_run_start(session_id)));
    }

    fn on_turn_start(&self, session_id: &SessionId, turn: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(session_id, turn)
        }));
    }

    fn on_turn_complete(
        &self,
        session_id: &SessionId,
        turn: u32,
        tool_calls: usize,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_complete(session_id, turn, tool_calls, elapsed)
        }));
    }

    fn on_run_complete(&self, session_id: &SessionId, turns: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_complete(session_id, turns, elapsed)
        }));
    }

    fn on_run_failure(&self, session_id: Option<&SessionId>, error: &AgentError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_failure(session_id, error, elapsed)
        }));
    }
}

/// Fans each callback out to several hook sets in order.
#[derive(Default)]
pub struct CompositeHooks {
    tool_hooks: Vec<Box<dyn ToolRuntimeHooks>>,
    agent_hooks: Vec<Box<dyn AgentRunHooks>>,
}

impl CompositeHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool_hooks(mut self, hooks: impl ToolRuntimeHooks + 'static) -> Self {
        self.tool_hooks.push(Box::new(hooks));
        self
    }

    pub fn with_agent_hooks(mut self, hooks: impl AgentRunHooks + 'static) -> Self {
        self.agent_hooks.push(Box::new(hooks));
        self
    }
}

impl ToolRuntimeHooks for CompositeHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolContext<'_>) {
        for hooks in &self.tool_hooks {
            hooks.on_execution_start(tool_call, context);
        }
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolContext<'_>,
        output: &Value,
        elapsed: Duration,
    ) {
        for hooks in &self.tool_hooks {
            hooks.on_execution_success(tool_call, context, output, elapsed);
        }
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolContext<'_>,
        error: &ToolError,
        elapsed: Duration,
    ) {
        for hooks in &self.tool_hooks {
            hooks.on_execution_failure(tool_call, context, error, elapsed);
        }
    }
}

impl AgentRunHooks for CompositeHooks {
    fn on_run_start(&self, session_id: &SessionId) {
        for hooks in &self.agent_hooks {
            hooks.on_run_start(session_id);
        }
    }

    fn on_turn_start(&self, session_id: &SessionId, turn: u32) {
        for hooks in &self.agent_hooks {
            hooks.on_turn_start(session_id, turn);
        }
    }

    fn on_turn_complete(
        &self,
        session_id: &SessionId,
        turn: u32,
        tool_calls: usize,
        elapsed: Duration,
    ) {
        for hooks in &self.agent_hooks {
            hooks.on_turn_complete(session_id, turn, tool_calls, elapsed);
        }
    }

    fn on_run_complete(&self, session_id: &SessionId, turns: u32, elapsed: Duration) {
        for hooks in &self.agent_hooks {
            hooks.on_run_complete(session_id, turns, elapsed);
        }
    }

    fn on_run_failure(&self, session_id: Option<&SessionId>, error: &AgentError, elapsed: Duration) {
        for hooks in &self.agent_hooks {
            hooks.on_run_failure(session_id, error, elapsed);
        }
    }
}
