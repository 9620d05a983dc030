//! OpenAI provider implementation over transport and shared models.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BoxedEventStream, ModelProvider, ModelRequest, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager, StreamEvent,
};

use super::auth::resolve_openai_auth;
use super::transport::OpenAiTransport;
use super::types::{OpenAiMessage, OpenAiRequest, OpenAiTool};

#[derive(Clone)]
pub struct OpenAiProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
}

impl OpenAiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            fallback_model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub(crate) fn build_openai_request(&self, request: ModelRequest) -> OpenAiRequest {
        let model = if request.model.trim().is_empty() {
            self.fallback_model.clone()
        } else {
            request.model
        };

        OpenAiRequest {
            model,
            messages: request
                .messages
                .into_iter()
                .map(OpenAiMessage::from)
                .collect(),
            tools: request.tools.into_iter().map(OpenAiTool::from).collect(),
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            stream: true,
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("transport", &self.transport)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let auth = resolve_openai_auth(&self.credentials)?;
            request.validate()?;
            let openai_request = self.build_openai_request(request);
            let mut chunks = self.transport.stream(openai_request, auth).await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    yield StreamEvent::from(chunk?);
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}
