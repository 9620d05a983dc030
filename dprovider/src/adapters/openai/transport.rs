//! OpenAI transport trait and reqwest-based SSE implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::serde_api::{build_api_request, extract_error_message, parse_stream_payload};
use super::types::{OpenAiAuth, OpenAiFinishReason, OpenAiRequest, OpenAiStreamChunk, OpenAiUsage};

pub type OpenAiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("OpenAI request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let model_for_fallback = request.model.clone();
            let api_request = build_api_request(request)?;
            let url = self.endpoint("chat/completions");
            let OpenAiAuth::ApiKey(key) = &auth;
            let response = self
                .client
                .post(url)
                .bearer_auth(key.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut bytes = response.bytes_stream();
                let mut lines = SseLineBuffer::default();
                let mut model = None::<String>;
                let mut finish_reason = None::<OpenAiFinishReason>;
                let mut usage = OpenAiUsage::default();
                let mut finished = false;

                while let Some(item) = bytes.next().await {
                    let item = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    lines.push(&item);

                    while let Some(line) = lines.next_line() {
                        let line = line?;
                        let Some(payload) = sse_data_payload(&line) else {
                            continue;
                        };

                        if payload == "[DONE]" {
                            finished = true;
                            break;
                        }

                        let chunks = parse_stream_payload(
                            payload,
                            &mut model,
                            &mut finish_reason,
                            &mut usage,
                        )?;
                        for chunk in chunks {
                            yield chunk;
                        }
                    }

                    if finished {
                        break;
                    }
                }

                if !finished && let Some(line) = lines.finish() {
                    let line = line?;
                    if let Some(payload) = sse_data_payload(&line)
                        && payload != "[DONE]"
                    {
                        let chunks = parse_stream_payload(
                            payload,
                            &mut model,
                            &mut finish_reason,
                            &mut usage,
                        )?;
                        for chunk in chunks {
                            yield chunk;
                        }
                    }
                }

                yield OpenAiStreamChunk::Finished {
                    model: model.unwrap_or(model_for_fallback),
                    finish_reason: finish_reason.unwrap_or(OpenAiFinishReason::Other),
                    usage,
                };
            };

            Ok(Box::pin(stream) as OpenAiChunkStream<'a>)
        })
    }
}

/// Returns the payload of an SSE `data:` line, or `None` for comments,
/// event names and blank separators.
pub(crate) fn sse_data_payload(line: &str) -> Option<&str> {
    let line = line.trim();
    line.strip_prefix("data:").map(str::trim)
}

/// Splits a byte stream into lines without assuming chunk boundaries fall on
/// UTF-8 character boundaries.
#[derive(Debug, Default)]
pub(crate) struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub(crate) fn next_line(&mut self) -> Option<Result<String, ProviderError>> {
        let newline = self.buffer.iter().position(|byte| *byte == b'\n')?;
        let line = self.buffer.drain(..=newline).collect::<Vec<_>>();
        Some(
            String::from_utf8(line)
                .map_err(|err| ProviderError::protocol(format!("invalid UTF-8 in stream: {err}"))),
        )
    }

    /// Drains a trailing line left unterminated when the body ends.
    pub(crate) fn finish(&mut self) -> Option<Result<String, ProviderError>> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Some(
            String::from_utf8(line)
                .map_err(|err| ProviderError::protocol(format!("invalid UTF-8 in stream: {err}"))),
        )
    }
}
