//! Run requests and the event protocol streamed back to callers.
//!
//! Events serialize as `{"type": ...}`-tagged JSON objects so a transport can
//! forward them without translation.
//!
//! ```rust
//! use dagent::AgentEvent;
//!
//! let event = AgentEvent::status("Thinking...");
//! assert_eq!(
//!     serde_json::to_value(&event).expect("event should serialize"),
//!     serde_json::json!({"type": "status", "message": "Thinking..."})
//! );
//! assert!(!event.is_terminal());
//! ```

use std::pin::Pin;

use dcommon::{SessionId, TraceId};
use ddeck::{ContextFile, StyleTemplate};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentRunRequest {
    pub instructions: String,
    /// Selects the prompt for editing an existing deck.
    pub continuation: bool,
    pub session_id: Option<SessionId>,
    /// Replaces the session's context files when present.
    pub context_files: Option<Vec<ContextFile>>,
    /// Replaces the session's style template when present.
    pub style_template: Option<StyleTemplate>,
    /// Overrides the policy model for this run.
    pub model: Option<String>,
    pub trace_id: Option<TraceId>,
}

impl AgentRunRequest {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Self::default()
        }
    }

    pub fn continuation(mut self) -> Self {
        self.continuation = true;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_context_files(mut self, context_files: Vec<ContextFile>) -> Self {
        self.context_files = Some(context_files);
        self
    }

    pub fn with_style_template(mut self, style_template: StyleTemplate) -> Self {
        self.style_template = Some(style_template);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// One dispatched tool call as shown to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseCall {
    pub name: String,
    pub input: Value,
    pub friendly: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolUseEvent {
    Calls { tool_calls: Vec<ToolUseCall> },
    Friendly { friendly: Vec<String> },
    Details { details: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Init {
        session_id: SessionId,
        message: String,
    },
    Status {
        message: String,
    },
    Assistant {
        text: String,
    },
    ToolUse(ToolUseEvent),
    Error {
        error: String,
    },
    Complete {
        success: bool,
        result: String,
        message_count: u32,
        session_id: SessionId,
        slide_count: usize,
    },
}

impl AgentEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// `error` and `complete` end a run; exactly one of them is emitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Complete { .. })
    }
}

pub type AgentEventStream<'a> = Pin<Box<dyn Stream<Item = AgentEvent> + Send + 'a>>;
