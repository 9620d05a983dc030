//! Tool runtime trait and default registry-backed executor.
//!
//! The runtime is the dispatch boundary: unknown tools, handler errors and
//! handler panics all come back as a [`ToolOutcome`] holding an error, never as
//! a failure of the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use dprovider::{ToolCall, ToolDefinition};
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::{
    NoopToolRuntimeHooks, ToolArgs, ToolContext, ToolError, ToolFuture, ToolOutcome, ToolRegistry,
    ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    /// Tool definitions advertised to the model, in registration order.
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        tool_call: &'a ToolCall,
        args: ToolArgs,
        context: &'a mut ToolContext<'_>,
    ) -> ToolFuture<'a, ToolOutcome>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_call: &'a ToolCall,
        args: ToolArgs,
        context: &'a mut ToolContext<'_>,
    ) -> ToolFuture<'a, ToolOutcome> {
        Box::pin(async move {
            let started_at = Instant::now();
            self.hooks.on_execution_start(tool_call, context);

            let result = match self.registry.get(&tool_call.name) {
                Some(tool) => {
                    match AssertUnwindSafe(tool.invoke(&args, context))
                        .catch_unwind()
                        .await
                    {
                        Ok(result) => result,
                        Err(panic) => Err(ToolError::panicked(format!(
                            "tool panicked: {}",
                            panic_message(panic.as_ref())
                        ))),
                    }
                }
                None => Err(ToolError::not_found(format!(
                    "Tool {} not found",
                    tool_call.name
                ))),
            };

            let elapsed = started_at.elapsed();
            let result = result.map_err(|error| {
                error
                    .with_tool_name(tool_call.name.clone())
                    .with_tool_call_id(tool_call.id.clone())
            });

            match &result {
                Ok(output) => {
                    debug!(
                        session_id = %context.session_id(),
                        tool_name = %tool_call.name,
                        tool_call_id = %tool_call.id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "tool call succeeded"
                    );
                    self.hooks
                        .on_execution_success(tool_call, context, output, elapsed);
                }
                Err(error) => {
                    warn!(
                        session_id = %context.session_id(),
                        tool_name = %tool_call.name,
                        tool_call_id = %tool_call.id,
                        error_kind = ?error.kind,
                        error = %error.message,
                        "tool call failed"
                    );
                    self.hooks
                        .on_execution_failure(tool_call, context, error, elapsed);
                }
            }

            ToolOutcome::new(tool_call, result)
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use ddeck::Session;
    use dmemory::InMemorySessionStore;
    use dprovider::{ToolCall, ToolDefinition};
    use serde_json::{Value, json};

    use super::*;
    use crate::{ToolErrorKind, ToolSchema};

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: "{}".to_string(),
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolSchema::new().into_definition("echo", "Echoes arguments"),
            |args: &ToolArgs, ctx: &mut ToolContext<'_>| {
                Ok(json!({ "session": ctx.session_id().as_str(), "args": args }))
            },
        );
        registry.register_sync_fn(
            ToolSchema::new().into_definition("broken", "Always fails"),
            |_, _| Err(ToolError::execution("tool exploded")),
        );
        registry.register_sync_fn(
            ToolSchema::new().into_definition("panicky", "Panics"),
            |_, _| panic!("handler bug"),
        );
        registry
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolContext<'_>) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &ToolContext<'_>,
            _output: &Value,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", tool_call.name));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &ToolContext<'_>,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{:?}", tool_call.name, error.kind));
        }
    }

    async fn run(runtime: &DefaultToolRuntime, tool_call: &ToolCall) -> ToolOutcome {
        let store = InMemorySessionStore::new();
        let mut session = Session::new("session-1");
        let mut context = ToolContext::new(&mut session, &store);
        let args = json!({"k": "v"}).as_object().cloned().expect("object");
        runtime.execute(tool_call, args, &mut context).await
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let outcome = run(&runtime, &call("call_1", "echo")).await;
        assert_eq!(outcome.tool_call_id, "call_1");
        assert_eq!(
            outcome.payload(),
            json!({"session": "session-1", "args": {"k": "v"}})
        );
    }

    #[tokio::test]
    async fn unknown_tool_becomes_not_found_payload() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let outcome = run(&runtime, &call("call_2", "missing")).await;
        let error = outcome.result.clone().expect_err("lookup should fail");
        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(outcome.payload(), json!({"error": "Tool missing not found"}));
    }

    #[tokio::test]
    async fn handler_errors_carry_call_context() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let outcome = run(&runtime, &call("call_3", "broken")).await;
        let error = outcome.result.expect_err("tool should fail");
        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.tool_name.as_deref(), Some("broken"));
        assert_eq!(error.tool_call_id.as_deref(), Some("call_3"));
    }

    #[tokio::test]
    async fn handler_panics_are_contained() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let outcome = run(&runtime, &call("call_4", "panicky")).await;
        assert_eq!(
            outcome.payload(),
            json!({"error": "tool panicked: handler bug"})
        );
    }

    #[tokio::test]
    async fn hooks_observe_every_call() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry())).with_hooks(hooks.clone());

        run(&runtime, &call("a", "echo")).await;
        run(&runtime, &call("b", "missing")).await;

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "start:echo",
                "success:echo",
                "start:missing",
                "failure:missing:NotFound"
            ]
        );
    }

    #[test]
    fn definitions_follow_registration_order() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));
        let names = runtime
            .definitions()
            .into_iter()
            .map(|definition: ToolDefinition| definition.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["echo", "broken", "panicky"]);
    }
}
