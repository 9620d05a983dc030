//! Common `dprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, ContentPart, Message, ModelEventStream, ModelProvider, ModelRequest,
    ModelRequestBuilder, ProviderError, ProviderErrorKind, ProviderId, Role, StopReason,
    StreamEvent, TokenUsage, ToolCall, ToolCallDelta, ToolDefinition,
};
pub use dcommon::{BoxFuture, GenerationOptions};
