use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dagent::prelude::*;
use dcommon::BoxFuture;
use ddeck::Session;
use dmemory::{InMemorySessionStore, MemoryError, SessionStore};
use dprovider::{
    BoxedEventStream, ModelProvider, ModelRequest, ProviderError, ProviderFuture, ProviderId,
    Role, StopReason, StreamEvent, TokenUsage, ToolCallDelta, VecEventStream,
};
use futures_util::StreamExt;
use serde_json::{Value, json};

enum Turn {
    Stream(Vec<Result<StreamEvent, ProviderError>>),
    Refuse(ProviderError),
}

/// Replays one scripted turn per provider call; an exhausted script ends the run.
struct ScriptedProvider {
    turns: Mutex<VecDeque<Turn>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(turns: Vec<Turn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Custom("scripted")
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let turn = self.turns.lock().expect("turns lock").pop_front();
            match turn {
                Some(Turn::Refuse(error)) => Err(error),
                Some(Turn::Stream(events)) => {
                    Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
                }
                None => Ok(Box::pin(VecEventStream::new(vec![finished()])) as BoxedEventStream<'a>),
            }
        })
    }
}

/// Loads nothing and refuses every save.
struct ReadOnlyStore;

impl SessionStore for ReadOnlyStore {
    fn load<'a>(
        &'a self,
        _session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<Session>, MemoryError>> {
        Box::pin(async { Ok(None) })
    }

    fn save<'a>(&'a self, _session: &'a Session) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async { Err(MemoryError::storage("disk full")) })
    }
}

fn text(value: &str) -> Result<StreamEvent, ProviderError> {
    Ok(StreamEvent::TextDelta(value.to_string()))
}

fn fragment(delta: ToolCallDelta) -> Result<StreamEvent, ProviderError> {
    Ok(StreamEvent::ToolCallDelta(delta))
}

fn call(index: u32, id: &str, name: &str, arguments: &str) -> Result<StreamEvent, ProviderError> {
    fragment(
        ToolCallDelta::new(index)
            .with_id(id)
            .with_name(name)
            .with_arguments(arguments),
    )
}

fn finished() -> Result<StreamEvent, ProviderError> {
    Ok(StreamEvent::ResponseComplete {
        model: "gpt-4o-mini".to_string(),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    })
}

async fn run(service: &AgentService, request: AgentRunRequest) -> Vec<AgentEvent> {
    service.run(request).collect::<Vec<_>>().await
}

fn assert_single_terminal(events: &[AgentEvent]) {
    let terminal = events.iter().filter(|event| event.is_terminal()).count();
    assert_eq!(terminal, 1, "exactly one terminal event: {events:?}");
    assert!(
        events.last().is_some_and(AgentEvent::is_terminal),
        "terminal event should come last"
    );
}

fn tool_payloads(request: &ModelRequest) -> Vec<(String, Value)> {
    request
        .messages
        .iter()
        .filter(|message| message.role == Role::Tool)
        .map(|message| {
            (
                message.tool_call_id.clone().unwrap_or_default(),
                serde_json::from_str(&message.content).expect("tool payload should be json"),
            )
        })
        .collect()
}

#[tokio::test]
async fn fragmented_tool_calls_build_and_persist_a_deck() {
    let provider = ScriptedProvider::new(vec![
        Turn::Stream(vec![
            text("Building "),
            text("your deck."),
            fragment(ToolCallDelta::new(0).with_id("call_a").with_name("create_presentation")),
            fragment(ToolCallDelta::new(1).with_id("call_b").with_name("add_slide")),
            fragment(ToolCallDelta::new(0).with_arguments("{\"title\": \"Ti")),
            fragment(ToolCallDelta::new(1).with_arguments("{\"html\": \"<h1>Moon</h1>\", ")),
            fragment(ToolCallDelta::new(0).with_arguments("des\"}")),
            fragment(ToolCallDelta::new(1).with_arguments("\"position\": -1, \"layout\": \"title\"}")),
            finished(),
        ]),
        Turn::Stream(vec![call(0, "call_c", "commit_edits", "{\"dummy\": \"\"}"), finished()]),
        Turn::Stream(vec![text(" Done."), finished()]),
    ]);
    let store = Arc::new(InMemorySessionStore::new());
    let service = AgentService::builder(provider.clone(), store.clone()).build();

    let events = run(&service, AgentRunRequest::new("Make a deck about tides").with_session_id("tides")).await;

    assert_single_terminal(&events);
    assert_eq!(
        events[0],
        AgentEvent::Init {
            session_id: "tides".into(),
            message: "Starting agent...".to_string(),
        }
    );
    assert_eq!(
        events.last(),
        Some(&AgentEvent::Complete {
            success: true,
            result: "Building your deck. Done.".to_string(),
            message_count: 3,
            session_id: "tides".into(),
            slide_count: 1,
        })
    );
    assert!(events.contains(&AgentEvent::ToolUse(ToolUseEvent::Friendly {
        friendly: vec!["Adding slide: Moon".to_string()],
    })));

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|request| request.tools.len() == 10));

    let second = &requests[1];
    let assistant = &second.messages[2];
    assert_eq!(assistant.role, Role::Assistant);
    assert_eq!(assistant.content, "Building your deck.");
    assert_eq!(assistant.tool_calls[0].arguments, "{\"title\": \"Tides\"}");
    let payloads = tool_payloads(second);
    assert_eq!(payloads[0].0, "call_a");
    assert_eq!(payloads[0].1["title"], json!("Tides"));
    assert_eq!(payloads[1].0, "call_b");
    assert_eq!(payloads[1].1["slide_index"], json!(0));

    let commit = tool_payloads(&requests[2]);
    assert_eq!(commit[2].1["applied_count"], json!(1));

    let saved = store
        .load(&"tides".into())
        .await
        .expect("load should work")
        .expect("session should be saved");
    assert_eq!(saved.slide_count(), 1);
    assert!(saved.pending_edits.is_empty());
}

#[tokio::test]
async fn malformed_arguments_fall_back_to_defaults() {
    let provider = ScriptedProvider::new(vec![Turn::Stream(vec![
        call(0, "call_1", "create_presentation", "{\"title\": "),
        finished(),
    ])]);
    let store = Arc::new(InMemorySessionStore::new());
    let service = AgentService::builder(provider, store.clone()).build();

    let events = run(&service, AgentRunRequest::new("Start a deck").with_session_id("broken")).await;

    assert_single_terminal(&events);
    assert!(events.contains(&AgentEvent::ToolUse(ToolUseEvent::Calls {
        tool_calls: vec![ToolUseCall {
            name: "create_presentation".to_string(),
            input: json!({}),
            friendly: Some("Creating presentation: Untitled".to_string()),
            details: None,
        }],
    })));

    let saved = store
        .load(&"broken".into())
        .await
        .expect("load should work")
        .expect("session should be saved");
    let presentation = saved.presentation.expect("presentation should exist");
    assert_eq!(presentation.title, "Untitled Presentation");
}

#[tokio::test]
async fn tool_faults_are_relayed_and_the_run_continues() {
    let provider = ScriptedProvider::new(vec![Turn::Stream(vec![
        call(0, "call_1", "launch_rocket", "{}"),
        call(1, "call_2", "delete_slide", "{\"slide_index\": 4}"),
        finished(),
    ])]);
    let service = AgentService::builder(provider.clone(), Arc::new(InMemorySessionStore::new())).build();

    let events = run(&service, AgentRunRequest::new("Tidy up")).await;

    assert_single_terminal(&events);
    assert!(matches!(
        events.last(),
        Some(AgentEvent::Complete { success: true, slide_count: 0, .. })
    ));

    let requests = provider.requests();
    let payloads = tool_payloads(&requests[1]);
    assert_eq!(payloads[0].1, json!({"error": "Tool launch_rocket not found"}));
    assert!(payloads[1].1["error"].is_string());
}

#[tokio::test]
async fn refused_connection_ends_with_an_error_and_saves_nothing() {
    let provider = ScriptedProvider::new(vec![Turn::Refuse(ProviderError::authentication(
        "missing API key",
    ))]);
    let store = Arc::new(InMemorySessionStore::new());
    let service = AgentService::builder(provider, store.clone()).build();

    let events = run(&service, AgentRunRequest::new("Make a deck")).await;

    assert_single_terminal(&events);
    assert_eq!(events.last(), Some(&AgentEvent::error("Agent error: missing API key")));
    assert!(store.is_empty().expect("store should be readable"));
}

#[tokio::test]
async fn stream_failure_after_partial_text_is_fatal() {
    let provider = ScriptedProvider::new(vec![Turn::Stream(vec![
        text("Working"),
        Err(ProviderError::protocol("malformed SSE frame")),
        text("never seen"),
    ])]);
    let service = AgentService::builder(provider, Arc::new(InMemorySessionStore::new())).build();

    let events = run(&service, AgentRunRequest::new("Make a deck")).await;

    assert_single_terminal(&events);
    assert!(events.contains(&AgentEvent::Assistant {
        text: "Working".to_string()
    }));
    assert!(!events.contains(&AgentEvent::Assistant {
        text: "never seen".to_string()
    }));
    assert_eq!(events.last(), Some(&AgentEvent::error("Agent error: malformed SSE frame")));
}

#[tokio::test]
async fn endless_tool_calls_hit_the_turn_limit() {
    let turns = (0..5)
        .map(|turn| {
            Turn::Stream(vec![
                call(0, &format!("call_{turn}"), "list_slides", "{\"dummy\": \"\"}"),
                finished(),
            ])
        })
        .collect();
    let provider = ScriptedProvider::new(turns);
    let service = AgentService::builder(provider.clone(), Arc::new(InMemorySessionStore::new()))
        .policy(AgentPolicy::default().with_max_turns(Some(2)))
        .build();

    let events = run(&service, AgentRunRequest::new("Loop forever")).await;

    assert_single_terminal(&events);
    assert_eq!(
        events.last(),
        Some(&AgentEvent::error(
            "Agent error: turn limit of 2 reached before the model finished"
        ))
    );
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn blank_instructions_never_reach_the_provider() {
    let provider = ScriptedProvider::new(Vec::new());
    let service = AgentService::builder(provider.clone(), Arc::new(InMemorySessionStore::new())).build();

    let events = run(&service, AgentRunRequest::new("  ")).await;

    assert_eq!(
        events,
        vec![AgentEvent::error("Agent error: instructions must not be empty")]
    );
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn failed_final_save_replaces_complete_with_error() {
    let provider = ScriptedProvider::new(vec![Turn::Stream(vec![text("All set."), finished()])]);
    let service = AgentService::builder(provider, Arc::new(ReadOnlyStore)).build();

    let events = run(&service, AgentRunRequest::new("Say hi").with_session_id("ro")).await;

    assert_single_terminal(&events);
    assert!(matches!(events.last(), Some(AgentEvent::Error { error }) if error.contains("disk full")));
}

#[tokio::test]
async fn continuation_runs_carry_context_files_and_model_override() {
    let provider = ScriptedProvider::new(Vec::new());
    let service = AgentService::builder(provider.clone(), Arc::new(InMemorySessionStore::new())).build();

    let request = AgentRunRequest::new("Shorten slide 2")
        .continuation()
        .with_model("gpt-4o")
        .with_context_files(vec![ContextFile::new("notes.txt", "Keep it brief.")]);
    let events = run(&service, request).await;
    assert_single_terminal(&events);

    let requests = provider.requests();
    assert_eq!(requests[0].model, "gpt-4o");
    let system = &requests[0].messages[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.starts_with("You are editing an existing presentation."));
    assert!(system.content.contains("=== notes.txt ===\nKeep it brief."));
}

#[tokio::test]
async fn whitespace_text_ahead_of_tool_calls_keeps_the_loop_going() {
    let provider = ScriptedProvider::new(vec![
        Turn::Stream(vec![
            text("\n"),
            call(0, "call_t", "create_presentation", "{\"title\": \"Tides\"}"),
            finished(),
        ]),
        Turn::Stream(vec![text("\n\n"), call(0, "call_l", "list_slides", "{\"dummy\": \"\"}"), finished()]),
        Turn::Stream(vec![text("Ready."), finished()]),
    ]);
    let store = Arc::new(InMemorySessionStore::new());
    let service = AgentService::builder(provider.clone(), store).build();

    let events = run(&service, AgentRunRequest::new("Start a tides deck").with_session_id("ws")).await;

    assert_single_terminal(&events);
    assert!(matches!(
        events.last(),
        Some(AgentEvent::Complete { success: true, message_count: 3, .. })
    ));

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    let assistant = &requests[2].messages[4];
    assert_eq!(assistant.role, Role::Assistant);
    assert_eq!(assistant.content, "\n\n");
    assert_eq!(assistant.tool_calls[0].name, "list_slides");
    assert_eq!(tool_payloads(&requests[2])[1].1["count"], json!(0));
}
