//! Tool registration and dispatch for deck editing agents.
//!
//! Tools receive decoded arguments plus an explicit [`ToolContext`] naming the
//! session they act on. The [`ToolRuntime`] turns every result, including
//! errors and panics, into a payload the model can read.

mod args;
mod context;
mod deck;
mod error;
mod hooks;
mod registry;
mod runtime;
mod schema;
mod tool;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, ParamType, Tool, ToolArgs, ToolContext, ToolError, ToolErrorKind,
        ToolFuture, ToolOutcome, ToolRegistry, ToolRuntime, ToolRuntimeHooks, ToolSchema,
        deck_tool_registry, parse_arguments_lenient,
    };
}

pub use args::{
    integer_arg, object_arg, optional_integer, optional_string, parse_arguments_lenient,
    string_arg,
};
pub use context::{ToolContext, ToolOutcome};
pub use deck::{CommitEditsTool, DECK_TOOL_NAMES, deck_tool_registry, register_deck_tools};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use schema::{ParamType, ToolSchema};
pub use tool::{FunctionTool, Tool, ToolArgs, ToolFuture};
