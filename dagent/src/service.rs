//! Multi-turn streaming orchestration of provider calls and tool dispatch.
//!
//! A run loops between the provider and the tool runtime until the model ends
//! a turn without requesting tools. Every run ends with exactly one terminal
//! event: `complete` on success, `error` on a run-fatal fault.

use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use dmemory::SessionStore;
use dprovider::{Message, ModelProvider, ModelRequest, Role, StreamEvent, ToolDefinition};
use dtooling::{
    DefaultToolRuntime, ToolContext, ToolRuntime, deck_tool_registry, parse_arguments_lenient,
};
use futures_util::StreamExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    AgentError, AgentEvent, AgentEventStream, AgentRunHooks, AgentRunRequest, NoopAgentRunHooks,
    ToolCallAccumulator, ToolUseCall, ToolUseEvent, build_system_prompt, build_user_message,
    describe_tool_call,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TURNS: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentPolicy {
    pub model: String,
    /// `None` lets a run continue for as long as the model keeps calling tools.
    pub max_turns: Option<u32>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for AgentPolicy {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_turns: Some(DEFAULT_MAX_TURNS),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl AgentPolicy {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_turns(mut self, max_turns: Option<u32>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Clone)]
pub struct AgentService {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn SessionStore>,
    tool_runtime: Arc<dyn ToolRuntime>,
    policy: AgentPolicy,
    hooks: Arc<dyn AgentRunHooks>,
}

pub struct AgentServiceBuilder {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn SessionStore>,
    tool_runtime: Option<Arc<dyn ToolRuntime>>,
    policy: AgentPolicy,
    hooks: Arc<dyn AgentRunHooks>,
}

impl AgentServiceBuilder {
    pub fn tool_runtime(mut self, tool_runtime: Arc<dyn ToolRuntime>) -> Self {
        self.tool_runtime = Some(tool_runtime);
        self
    }

    pub fn policy(mut self, policy: AgentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn AgentRunHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> AgentService {
        let tool_runtime = self.tool_runtime.unwrap_or_else(|| {
            Arc::new(DefaultToolRuntime::new(Arc::new(deck_tool_registry())))
        });

        AgentService {
            provider: self.provider,
            store: self.store,
            tool_runtime,
            policy: self.policy,
            hooks: self.hooks,
        }
    }
}

impl AgentService {
    /// Starts a builder with the standard deck tools and the default policy.
    pub fn builder(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn SessionStore>,
    ) -> AgentServiceBuilder {
        AgentServiceBuilder {
            provider,
            store,
            tool_runtime: None,
            policy: AgentPolicy::default(),
            hooks: Arc::new(NoopAgentRunHooks),
        }
    }

    pub fn policy(&self) -> &AgentPolicy {
        &self.policy
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_runtime.definitions()
    }

    /// Runs one request to completion, yielding progress as it happens.
    ///
    /// Dropping the stream cancels the run at its next suspension point.
    pub fn run(&self, request: AgentRunRequest) -> AgentEventStream<'_> {
        Box::pin(stream! {
            let started_at = Instant::now();

            if request.instructions.trim().is_empty() {
                let error = AgentError::invalid_request("instructions must not be empty");
                self.hooks.on_run_failure(request.session_id.as_ref(), &error, started_at.elapsed());
                yield AgentEvent::error(error.event_text());
                return;
            }

            let mut session = match self.store.get_or_create(request.session_id.clone()).await {
                Ok(session) => session,
                Err(error) => {
                    let error = AgentError::from(error);
                    warn!(kind = error.kind.as_str(), error = %error.message, "failed to load session");
                    self.hooks.on_run_failure(request.session_id.as_ref(), &error, started_at.elapsed());
                    yield AgentEvent::error(error.event_text());
                    return;
                }
            };
            let session_id = session.session_id.clone();

            if let Some(context_files) = request.context_files.clone() {
                session.context_files = context_files;
            }
            if let Some(style_template) = request.style_template.clone() {
                session.style_template = Some(style_template);
            }

            yield AgentEvent::Init {
                session_id: session_id.clone(),
                message: "Starting agent...".to_string(),
            };
            yield AgentEvent::status("Connecting to model provider...");
            self.hooks.on_run_start(&session_id);
            info!(
                session_id = %session_id,
                continuation = request.continuation,
                "agent run started"
            );

            let model = request.model.clone().unwrap_or_else(|| self.policy.model.clone());
            let tools = self.tool_runtime.definitions();
            let mut messages = vec![
                Message::new(Role::System, build_system_prompt(&session, request.continuation)),
                build_user_message(&session, &request.instructions),
            ];

            let mut result_text = String::new();
            let mut message_count = 0_u32;
            let mut turn = 0_u32;

            loop {
                turn += 1;
                if let Some(max_turns) = self.policy.max_turns
                    && turn > max_turns
                {
                    let error = AgentError::turn_limit(max_turns);
                    warn!(session_id = %session_id, max_turns, "agent run hit its turn limit");
                    self.hooks.on_run_failure(Some(&session_id), &error, started_at.elapsed());
                    yield AgentEvent::error(error.event_text());
                    return;
                }

                let turn_started_at = Instant::now();
                self.hooks.on_turn_start(&session_id, turn);
                yield AgentEvent::status("Thinking...");

                let model_request = match self.model_request(&model, &messages, &tools) {
                    Ok(model_request) => model_request,
                    Err(error) => {
                        self.hooks.on_run_failure(Some(&session_id), &error, started_at.elapsed());
                        yield AgentEvent::error(error.event_text());
                        return;
                    }
                };

                let mut provider_stream = match self.provider.stream(model_request).await {
                    Ok(provider_stream) => provider_stream,
                    Err(error) => {
                        let error = AgentError::from(error);
                        warn!(session_id = %session_id, turn, error = %error.message, "provider request failed");
                        self.hooks.on_run_failure(Some(&session_id), &error, started_at.elapsed());
                        yield AgentEvent::error(error.event_text());
                        return;
                    }
                };

                let mut turn_text = String::new();
                let mut accumulator = ToolCallAccumulator::new();
                while let Some(event) = provider_stream.next().await {
                    match event {
                        Ok(StreamEvent::TextDelta(text)) => {
                            turn_text.push_str(&text);
                            result_text.push_str(&text);
                            yield AgentEvent::Assistant { text };
                        }
                        Ok(StreamEvent::ToolCallDelta(delta)) => accumulator.push(delta),
                        Ok(StreamEvent::ResponseComplete { stop_reason, usage, .. }) => {
                            debug!(
                                session_id = %session_id,
                                turn,
                                stop_reason = ?stop_reason,
                                total_tokens = usage.total_tokens,
                                "provider response complete"
                            );
                        }
                        Err(error) => {
                            let error = AgentError::from(error);
                            warn!(session_id = %session_id, turn, error = %error.message, "provider stream failed");
                            self.hooks.on_run_failure(Some(&session_id), &error, started_at.elapsed());
                            yield AgentEvent::error(error.event_text());
                            return;
                        }
                    }
                }
                drop(provider_stream);

                let tool_calls = accumulator.finish();
                message_count += 1;
                messages.push(Message::assistant(turn_text, tool_calls.clone()));

                if tool_calls.is_empty() {
                    self.hooks.on_turn_complete(&session_id, turn, 0, turn_started_at.elapsed());
                    break;
                }

                yield AgentEvent::status("Executing tools...");
                for tool_call in &tool_calls {
                    let args = parse_arguments_lenient(&tool_call.arguments);
                    let description = describe_tool_call(&tool_call.name, &args);

                    yield AgentEvent::ToolUse(ToolUseEvent::Calls {
                        tool_calls: vec![ToolUseCall {
                            name: tool_call.name.clone(),
                            input: Value::Object(args.clone()),
                            friendly: description.friendly.clone(),
                            details: description.details.clone(),
                        }],
                    });
                    if let Some(friendly) = description.friendly {
                        yield AgentEvent::ToolUse(ToolUseEvent::Friendly { friendly: vec![friendly] });
                    }
                    if let Some(details) = description.details {
                        yield AgentEvent::ToolUse(ToolUseEvent::Details { details: vec![details] });
                    }

                    let outcome = {
                        let mut context = ToolContext::new(&mut session, self.store.as_ref());
                        if let Some(trace_id) = request.trace_id.clone() {
                            context = context.with_trace_id(trace_id);
                        }
                        self.tool_runtime.execute(tool_call, args, &mut context).await
                    };
                    messages.push(outcome.into_tool_message());
                }

                self.hooks.on_turn_complete(
                    &session_id,
                    turn,
                    tool_calls.len(),
                    turn_started_at.elapsed(),
                );
            }

            if let Err(error) = self.store.save(&session).await {
                let error = AgentError::from(error);
                warn!(session_id = %session_id, error = %error.message, "failed to save session");
                self.hooks.on_run_failure(Some(&session_id), &error, started_at.elapsed());
                yield AgentEvent::error(error.event_text());
                return;
            }

            let slide_count = session.slide_count();
            self.hooks.on_run_complete(&session_id, turn, started_at.elapsed());
            info!(
                session_id = %session_id,
                turns = turn,
                message_count,
                slide_count,
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                "agent run complete"
            );

            yield AgentEvent::Complete {
                success: true,
                result: result_text,
                message_count,
                session_id,
                slide_count,
            };
        })
    }

    fn model_request(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelRequest, AgentError> {
        let mut builder = ModelRequest::builder(model)
            .messages(messages.to_vec())
            .tools(tools.to_vec());
        if let Some(temperature) = self.policy.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.policy.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for AgentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentService")
            .field("provider", &self.provider.id())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

