//! Streaming agent runs that drive deck tools through a model provider.
//!
//! [`AgentService::run`] returns a stream of [`AgentEvent`] values: progress
//! events while the model and tools work, then exactly one terminal `error` or
//! `complete` event.
//!
//! ```rust
//! use dagent::{AgentPolicy, AgentRunRequest};
//!
//! let request = AgentRunRequest::new("Add a closing slide")
//!     .continuation()
//!     .with_session_id("deck-7");
//! let policy = AgentPolicy::default().with_max_turns(Some(8));
//!
//! assert!(request.continuation);
//! assert_eq!(policy.model, "gpt-4o-mini");
//! ```

mod accumulator;
mod describe;
mod error;
mod hooks;
mod parser;
mod prompt;
mod service;
mod types;

pub mod prelude {
    pub use crate::{
        AgentError, AgentErrorKind, AgentEvent, AgentEventStream, AgentPolicy, AgentRunHooks,
        AgentRunRequest, AgentService, AgentServiceBuilder, BasicDocumentParser, DocumentParser,
        NoopAgentRunHooks, ToolUseCall, ToolUseEvent, UploadedFile,
    };
    pub use dcommon::{SessionId, TraceId};
    pub use ddeck::{ContextFile, Screenshot, StyleTemplate};
}

pub use accumulator::ToolCallAccumulator;
pub use describe::{ToolDescription, describe_tool_call};
pub use error::{AgentError, AgentErrorKind};
pub use hooks::{AgentRunHooks, NoopAgentRunHooks};
pub use parser::{BasicDocumentParser, DocumentParser, UploadedFile};
pub use prompt::{
    SYSTEM_PROMPT_CONTINUATION, SYSTEM_PROMPT_NEW, build_system_prompt, build_user_message,
};
pub use service::{AgentPolicy, AgentService, AgentServiceBuilder, DEFAULT_MAX_TURNS, DEFAULT_MODEL};
pub use types::{AgentEvent, AgentEventStream, AgentRunRequest, ToolUseCall, ToolUseEvent};
