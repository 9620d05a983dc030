//! Common imports for most deckwright applications.

#[cfg(feature = "provider-openai")]
pub use crate::build_runtime;
pub use crate::{
    AgentEvent, AgentPolicy, AgentRunRequest, AgentService, ContextFile, DeckwrightConfig,
    DocumentParser, ModelProvider, Runtime, Session, SessionId, SessionStore, StyleTemplate,
    UploadedFile, build_runtime_with, init_logging, load_context_files,
};
