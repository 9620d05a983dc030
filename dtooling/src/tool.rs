//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use ddeck::Session;
//! use dmemory::InMemorySessionStore;
//! use dprovider::ToolDefinition;
//! use dtooling::{FunctionTool, Tool, ToolArgs, ToolContext};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "slide_count".to_string(),
//!         description: "Counts committed slides".to_string(),
//!         input_schema: r#"{"type":"object"}"#.to_string(),
//!     },
//!     |_args: &ToolArgs, ctx: &mut ToolContext<'_>| Ok(json!(ctx.session.slide_count())),
//! );
//!
//! let store = InMemorySessionStore::new();
//! let mut session = Session::new("doc");
//! let mut ctx = ToolContext::new(&mut session, &store);
//! let value = futures_util::FutureExt::now_or_never(tool.invoke(&ToolArgs::new(), &mut ctx))
//!     .expect("sync tool should complete immediately")
//!     .expect("tool should succeed");
//! assert_eq!(value, json!(0));
//! ```

use std::sync::Arc;

use dcommon::BoxFuture;
use dprovider::ToolDefinition;
use serde_json::{Map, Value};

use crate::{ToolContext, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Decoded call arguments.
pub type ToolArgs = Map<String, Value>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(
        &'a self,
        args: &'a ToolArgs,
        context: &'a mut ToolContext<'_>,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type ToolHandler =
    dyn Fn(&ToolArgs, &mut ToolContext<'_>) -> Result<Value, ToolError> + Send + Sync;

/// A tool backed by a synchronous closure over the call context.
pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(&ToolArgs, &mut ToolContext<'_>) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            definition,
            handler: Arc::new(handler),
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: &'a ToolArgs,
        context: &'a mut ToolContext<'_>,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move { (self.handler)(args, context) })
    }
}
