//! Per-call execution context and tool outcomes.

use std::fmt::{Debug, Formatter};

use dcommon::{SessionId, TraceId};
use ddeck::Session;
use dmemory::SessionStore;
use dprovider::{Message, ToolCall};
use serde_json::{Value, json};

use crate::ToolError;

/// Binds one tool call to the session it edits and the store that persists it.
///
/// The orchestrator builds a fresh context for every call, so a handler can
/// never hold on to a session past the call that borrowed it.
pub struct ToolContext<'a> {
    pub session: &'a mut Session,
    pub store: &'a dyn SessionStore,
    pub trace_id: Option<TraceId>,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a mut Session, store: &'a dyn SessionStore) -> Self {
        Self {
            session,
            store,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session.session_id
    }
}

impl Debug for ToolContext<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("session_id", &self.session.session_id)
            .field("trace_id", &self.trace_id)
            .finish_non_exhaustive()
    }
}

/// Result of dispatching one tool call. Failures are data, not control flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub tool_call_id: String,
    pub tool_name: String,
    pub result: Result<Value, ToolError>,
}

impl ToolOutcome {
    pub fn new(tool_call: &ToolCall, result: Result<Value, ToolError>) -> Self {
        Self {
            tool_call_id: tool_call.id.clone(),
            tool_name: tool_call.name.clone(),
            result,
        }
    }

    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// JSON relayed back to the model: the handler value or `{"error": ...}`.
    pub fn payload(&self) -> Value {
        match &self.result {
            Ok(value) => value.clone(),
            Err(error) => json!({ "error": error.message }),
        }
    }

    pub fn into_tool_message(self) -> Message {
        Message::tool_result(self.tool_call_id.clone(), self.payload().to_string())
    }
}

#[cfg(test)]
mod tests {
    use dprovider::{Role, ToolCall};
    use serde_json::json;

    use super::ToolOutcome;
    use crate::ToolError;

    fn call() -> ToolCall {
        ToolCall {
            id: "call_7".to_string(),
            name: "get_slide".to_string(),
            arguments: "{}".to_string(),
        }
    }

    #[test]
    fn error_outcomes_become_error_payloads() {
        let outcome = ToolOutcome::new(
            &call(),
            Err(ToolError::execution("Invalid slide index: 4").with_tool_name("get_slide")),
        );
        assert!(outcome.is_error());
        assert_eq!(outcome.payload(), json!({"error": "Invalid slide index: 4"}));
    }

    #[test]
    fn tool_message_carries_call_id_and_serialized_payload() {
        let outcome = ToolOutcome::new(&call(), Ok(json!({"index": 0})));
        let message = outcome.into_tool_message();
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_7"));
        assert_eq!(message.content, r#"{"index":0}"#);
    }
}
