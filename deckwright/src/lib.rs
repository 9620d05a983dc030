//! Unified facade over the deckwright workspace crates.
//!
//! Most applications depend on this crate alone: it re-exports the deck model,
//! tools, stores and agent service, and adds configuration loading, logging
//! setup and runtime wiring.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use deckwright::{AgentPolicy, InMemorySessionStore, VecEventStream, build_runtime_with};
//! use deckwright::{BoxedEventStream, ModelProvider, ModelRequest, ProviderError, ProviderFuture, ProviderId};
//!
//! struct SilentProvider;
//!
//! impl ModelProvider for SilentProvider {
//!     fn id(&self) -> ProviderId {
//!         ProviderId::Custom("silent")
//!     }
//!
//!     fn stream<'a>(
//!         &'a self,
//!         _request: ModelRequest,
//!     ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
//!         Box::pin(async { Ok(Box::pin(VecEventStream::new(Vec::new())) as BoxedEventStream<'a>) })
//!     }
//! }
//!
//! let runtime = build_runtime_with(
//!     Arc::new(SilentProvider),
//!     Arc::new(InMemorySessionStore::new()),
//!     AgentPolicy::default(),
//! );
//! assert_eq!(runtime.agent.tool_definitions().len(), 10);
//! ```

mod config;
mod logging;

pub mod prelude;
pub mod runtime;

pub use dagent;
pub use dcommon;
pub use ddeck;
pub use dmemory;
pub use dobserve;
pub use dprovider;
pub use dtooling;

pub use config::{
    AgentConfig, CONFIG_PATH_ENV, ConfigError, ConfigErrorKind, DEFAULT_BASE_URL,
    DeckwrightConfig, LogFormat, LoggingConfig, ProviderConfig, StorageBackend, StorageConfig,
};
pub use logging::init_logging;
#[cfg(feature = "provider-openai")]
pub use runtime::build_runtime;
pub use runtime::{
    Runtime, build_runtime_with, deck_tool_runtime, load_context_files, observability_hooks,
};

pub use dagent::{
    AgentError, AgentErrorKind, AgentEvent, AgentEventStream, AgentPolicy, AgentRunHooks,
    AgentRunRequest, AgentService, AgentServiceBuilder, BasicDocumentParser, DocumentParser,
    NoopAgentRunHooks, ToolUseCall, ToolUseEvent, UploadedFile,
};
pub use dcommon::{BoxFuture, SessionId, TraceId};
pub use ddeck::{
    CommitSummary, ContextFile, DeckError, DeckErrorKind, EditOperation, PendingEdit,
    Presentation, Screenshot, Session, Slide, SlideLayout, StyleTemplate,
};
pub use dmemory::{
    FilesystemSessionStore, InMemorySessionStore, MemoryError, MemoryErrorKind,
    SessionStore, SessionStoreConfig, SqliteSessionStore, create_session_store,
};
pub use dprovider::{
    BoxedEventStream, ContentPart, Message, ModelProvider, ModelRequest, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderId, Role, SecretString, SecureCredentialManager,
    StreamEvent, ToolCall, ToolCallDelta, ToolDefinition, VecEventStream,
};
pub use dtooling::{
    DefaultToolRuntime, FunctionTool, Tool, ToolContext, ToolError, ToolErrorKind, ToolOutcome,
    ToolRegistry, ToolRuntime, ToolRuntimeHooks, deck_tool_registry,
};
