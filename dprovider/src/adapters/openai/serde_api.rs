//! OpenAI HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

use super::types::{
    OpenAiContentPart, OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiRole,
    OpenAiStreamChunk, OpenAiTool, OpenAiToolCall, OpenAiToolCallDelta, OpenAiUsage,
};

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .map(OpenAiApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "OpenAI request requires at least one message",
        ));
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .into_iter()
                .map(OpenAiApiTool::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    let tool_choice = tools.as_ref().map(|_| "auto".to_string());

    Ok(OpenAiApiRequest {
        model: request.model,
        messages,
        tools,
        tool_choice,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream: request.stream,
    })
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> OpenAiFinishReason {
    match value {
        Some("stop") => OpenAiFinishReason::Stop,
        Some("length") => OpenAiFinishReason::Length,
        Some("tool_calls") | Some("function_call") => OpenAiFinishReason::ToolCalls,
        Some("content_filter") => OpenAiFinishReason::ContentFilter,
        _ => OpenAiFinishReason::Other,
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

/// Decodes one SSE `data:` payload into zero or more stream chunks.
///
/// A chunk with no choices (usage-only or keep-alive frames) yields nothing
/// except an optional usage update reported through `usage`.
pub(crate) fn parse_stream_payload(
    payload: &str,
    model: &mut Option<String>,
    finish_reason: &mut Option<OpenAiFinishReason>,
    usage: &mut OpenAiUsage,
) -> Result<Vec<OpenAiStreamChunk>, ProviderError> {
    let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload).map_err(|err| {
        ProviderError::protocol(format!("failed to decode OpenAI stream chunk: {err}"))
    })?;

    if model.is_none() && !parsed.model.is_empty() {
        *model = Some(parsed.model);
    }

    if let Some(reported) = parsed.usage {
        *usage = OpenAiUsage {
            prompt_tokens: reported.prompt_tokens,
            completion_tokens: reported.completion_tokens,
            total_tokens: reported.total_tokens,
        };
    }

    let mut chunks = Vec::new();
    let Some(choice) = parsed.choices.into_iter().next() else {
        return Ok(chunks);
    };

    if let Some(content) = choice.delta.content
        && !content.is_empty()
    {
        chunks.push(OpenAiStreamChunk::TextDelta(content));
    }

    for delta_call in choice.delta.tool_calls.unwrap_or_default() {
        let (name, arguments) = match delta_call.function {
            Some(function) => (function.name, function.arguments),
            None => (None, None),
        };

        chunks.push(OpenAiStreamChunk::ToolCallDelta(OpenAiToolCallDelta {
            index: delta_call.index.unwrap_or(0),
            id: delta_call.id,
            name,
            arguments,
        }));
    }

    if choice.finish_reason.is_some() {
        *finish_reason = Some(parse_finish_reason(choice.finish_reason.as_deref()));
    }

    Ok(chunks)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: Option<OpenAiApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiApiRequestToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum OpenAiApiContent {
    Text(String),
    Parts(Vec<OpenAiApiContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiApiImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiImageUrl {
    pub url: String,
}

impl From<OpenAiContentPart> for OpenAiApiContentPart {
    fn from(value: OpenAiContentPart) -> Self {
        match value {
            OpenAiContentPart::Text(text) => Self::Text { text },
            OpenAiContentPart::ImageUrl(url) => Self::ImageUrl {
                image_url: OpenAiApiImageUrl { url },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequestToolCall {
    pub id: String,
    pub r#type: String,
    pub function: OpenAiApiToolFunction,
}

impl From<OpenAiToolCall> for OpenAiApiRequestToolCall {
    fn from(value: OpenAiToolCall) -> Self {
        Self {
            id: value.id,
            r#type: "function".to_string(),
            function: OpenAiApiToolFunction {
                name: value.name,
                arguments: value.arguments,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiToolFunction {
    pub name: String,
    pub arguments: String,
}

impl TryFrom<OpenAiMessage> for OpenAiApiMessage {
    type Error = ProviderError;

    fn try_from(value: OpenAiMessage) -> Result<Self, Self::Error> {
        let has_tool_calls = !value.tool_calls.is_empty();
        let content = if !value.parts.is_empty() {
            Some(OpenAiApiContent::Parts(
                value
                    .parts
                    .into_iter()
                    .map(OpenAiApiContentPart::from)
                    .collect(),
            ))
        } else if value.role == OpenAiRole::Assistant && value.content.trim().is_empty() {
            // Whitespace streamed ahead of tool calls carries nothing to resend.
            None
        } else if value.content.trim().is_empty() {
            return Err(ProviderError::invalid_request(format!(
                "OpenAI {} message content must not be empty",
                value.role.as_str()
            )));
        } else {
            Some(OpenAiApiContent::Text(value.content))
        };

        if value.role == OpenAiRole::Tool && value.tool_call_id.is_none() {
            return Err(ProviderError::invalid_request(
                "OpenAI tool message requires a tool_call_id",
            ));
        }

        if content.is_none() && !has_tool_calls {
            return Err(ProviderError::invalid_request(
                "OpenAI assistant message requires content or tool calls",
            ));
        }

        Ok(Self {
            role: value.role.as_str().to_string(),
            content,
            tool_calls: has_tool_calls.then(|| {
                value
                    .tool_calls
                    .into_iter()
                    .map(OpenAiApiRequestToolCall::from)
                    .collect()
            }),
            tool_call_id: value.tool_call_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiTool {
    pub r#type: String,
    pub function: OpenAiApiFunction,
}

impl TryFrom<OpenAiTool> for OpenAiApiTool {
    type Error = ProviderError;

    fn try_from(value: OpenAiTool) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&value.input_schema)
            .map_err(|_| ProviderError::invalid_request("OpenAI tool schema must be valid JSON"))?;

        Ok(Self {
            r#type: "function".to_string(),
            function: OpenAiApiFunction {
                name: value.name,
                description: value.description,
                parameters,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<OpenAiApiStreamChoice>,
    #[serde(default)]
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamChoice {
    #[serde(default)]
    pub delta: OpenAiApiStreamDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OpenAiApiStreamDelta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<OpenAiApiDeltaToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiDeltaToolCall {
    pub index: Option<u32>,
    pub id: Option<String>,
    pub function: Option<OpenAiApiDeltaToolFunction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiDeltaToolFunction {
    pub name: Option<String>,
    pub arguments: Option<String>,
}
