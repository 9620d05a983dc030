//! Runtime wiring from configuration to a ready-to-run [`AgentService`].

use std::sync::Arc;

use dagent::{AgentPolicy, AgentRunHooks, AgentService, DocumentParser, UploadedFile};
use ddeck::ContextFile;
use dmemory::SessionStore;
use dobserve::{
    CompositeHooks, MetricsObservabilityHooks, SafeAgentHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
use dprovider::ModelProvider;
use dtooling::{DefaultToolRuntime, ToolRuntime, ToolRuntimeHooks, deck_tool_registry};
use tracing::warn;

#[derive(Clone)]
pub struct Runtime {
    pub agent: AgentService,
    pub store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("agent", &self.agent)
            .finish_non_exhaustive()
    }
}

/// Tracing and metrics hooks, each isolated from panics.
pub fn observability_hooks() -> CompositeHooks {
    CompositeHooks::new()
        .with_tool_hooks(SafeToolHooks::new(TracingObservabilityHooks))
        .with_tool_hooks(SafeToolHooks::new(MetricsObservabilityHooks))
        .with_agent_hooks(SafeAgentHooks::new(TracingObservabilityHooks))
        .with_agent_hooks(SafeAgentHooks::new(MetricsObservabilityHooks))
}

/// The standard deck tools, reporting to `hooks`.
pub fn deck_tool_runtime(hooks: Arc<dyn ToolRuntimeHooks>) -> Arc<dyn ToolRuntime> {
    Arc::new(DefaultToolRuntime::new(Arc::new(deck_tool_registry())).with_hooks(hooks))
}

/// Wires an explicit provider and store with the standard tools and hooks.
pub fn build_runtime_with(
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn SessionStore>,
    policy: AgentPolicy,
) -> Runtime {
    let hooks = Arc::new(observability_hooks());
    let tool_hooks: Arc<dyn ToolRuntimeHooks> = hooks.clone();
    let agent_hooks: Arc<dyn AgentRunHooks> = hooks;

    let agent = AgentService::builder(provider, Arc::clone(&store))
        .tool_runtime(deck_tool_runtime(tool_hooks))
        .policy(policy)
        .hooks(agent_hooks)
        .build();

    Runtime { agent, store }
}

/// Builds the OpenAI-compatible provider and session store described by `config`.
///
/// A missing API key is not an error here: runs fail with an authentication
/// error event until the key is available.
#[cfg(feature = "provider-openai")]
pub fn build_runtime(config: &crate::DeckwrightConfig) -> Result<Runtime, crate::ConfigError> {
    use std::time::Duration;

    use dmemory::create_session_store;
    use dprovider::{OpenAiHttpTransport, OpenAiProvider, ProviderId, SecureCredentialManager};

    use crate::ConfigError;

    config.validate()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .build()
        .map_err(|error| ConfigError::invalid(format!("failed to build HTTP client: {error}")))?;
    let transport = OpenAiHttpTransport::new(client).with_base_url(config.provider.base_url.clone());

    let credentials = SecureCredentialManager::new();
    match std::env::var(&config.provider.api_key_env) {
        Ok(api_key) if !api_key.trim().is_empty() => credentials
            .set_api_key(ProviderId::OpenAi, api_key)
            .map_err(|error| ConfigError::invalid(error.message))?,
        _ => warn!(
            api_key_env = %config.provider.api_key_env,
            "API key environment variable is not set"
        ),
    }

    let provider = OpenAiProvider::new(Arc::new(credentials), Arc::new(transport))
        .with_fallback_model(config.provider.model.clone());
    let store = create_session_store(config.storage.store_config()).map_err(|error| {
        ConfigError::invalid(format!("failed to open session store: {}", error.message))
    })?;

    Ok(build_runtime_with(Arc::new(provider), store, config.policy()))
}

/// Extracts text from uploaded files. Files that fail to parse are kept with
/// empty text so the rest of the run can proceed.
pub async fn load_context_files(
    parser: &dyn DocumentParser,
    files: &[UploadedFile],
) -> Vec<ContextFile> {
    let mut context_files = Vec::with_capacity(files.len());
    for file in files {
        let text = match parser.parse(file).await {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    filename = %file.filename,
                    error = %error,
                    "failed to parse context file"
                );
                String::new()
            }
        };
        context_files.push(ContextFile::new(file.filename.clone(), text));
    }
    context_files
}
