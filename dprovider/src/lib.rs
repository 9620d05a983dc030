//! Provider contracts and adapters for streaming chat models.
//!
//! The orchestrator only depends on [`ModelProvider`], [`ModelRequest`] and
//! [`StreamEvent`]. Concrete adapters live under [`adapters`] behind cargo
//! features.
//!
//! ```rust
//! use dprovider::{Message, ModelRequest, Role, ToolDefinition};
//!
//! let request = ModelRequest::builder("gpt-4o-mini")
//!     .message(Message::new(Role::User, "Create a three slide deck about tides"))
//!     .tools(vec![ToolDefinition {
//!         name: "create_presentation".to_string(),
//!         description: "Create a new presentation".to_string(),
//!         input_schema: "{\"type\":\"object\"}".to_string(),
//!     }])
//!     .build()
//!     .expect("request should be valid");
//!
//! assert_eq!(request.tools.len(), 1);
//! assert_eq!(request.messages.len(), 1);
//! ```

pub mod adapters;
pub mod credentials;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod stream;

pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    ContentPart, Message, ModelRequest, ModelRequestBuilder, ProviderId, Role, StopReason,
    TokenUsage, ToolCall, ToolCallDelta, ToolDefinition,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};

#[cfg(feature = "provider-openai")]
pub use adapters::openai::{OpenAiHttpTransport, OpenAiProvider, OpenAiTransport};
