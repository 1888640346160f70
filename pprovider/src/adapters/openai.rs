//! OpenAI-compatible chat-completions adapter.
//!
//! One adapter covers every backend speaking the `/chat/completions`
//! protocol; backends differ only in base URL, model name, and credentials.
//! The HTTP layer sits behind [`ChatTransport`] so provider logic is testable
//! without a network.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    BoxedChunkStream, ChunkKind, FinishReason, LanguageModel, LlmError, Message, ModelFuture,
    ModelResponse, ProviderCredentials, SecretString, StreamChunk, ToolCall, ToolDefinition,
};

/// Wire-shaped chat request. [`Message`] and [`ToolDefinition`] already
/// serialize to the protocol's JSON, so no separate API structs are needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    pub stream: bool,
}

pub trait ChatTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a SecretString,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>>;

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a SecretString,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>>;
}

#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: Client,
    base_url: String,
}

impl HttpChatTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(
        &self,
        request: &ChatRequest,
        api_key: &SecretString,
    ) -> Result<Response, LlmError> {
        let url = self.endpoint("chat/completions");
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LlmError::timeout(err.to_string())
                } else {
                    LlmError::transport(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response)
    }

    async fn parse_error(response: Response) -> LlmError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("chat request failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::authentication(message),
            StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                LlmError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                LlmError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                LlmError::unavailable(message)
            }
            _ => LlmError::transport(message),
        }
    }
}

impl ChatTransport for HttpChatTransport {
    fn complete<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a SecretString,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>> {
        Box::pin(async move {
            let response = self.send(&request, api_key).await?;
            let parsed: ApiResponse = response
                .json()
                .await
                .map_err(|err| LlmError::transport(err.to_string()))?;

            ModelResponse::try_from(parsed)
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: ChatRequest,
        api_key: &'a SecretString,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self.send(&request, api_key).await?;

            let stream = try_stream! {
                let mut bytes_stream = response.bytes_stream();
                let mut sse_buffer = String::new();
                let mut finished = false;
                let mut tool_calls: BTreeMap<u32, ToolCall> = BTreeMap::new();
                let mut finish_reason = None::<FinishReason>;

                while let Some(item) = bytes_stream.next().await {
                    let bytes = item.map_err(|err| LlmError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| LlmError::transport(err.to_string()))?;
                    sse_buffer.push_str(text);

                    while let Some(newline_index) = sse_buffer.find('\n') {
                        let line = sse_buffer.drain(..=newline_index).collect::<String>();
                        let line = line.trim();

                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        if payload == "[DONE]" {
                            finished = true;
                            break;
                        }

                        let parsed: ApiStreamResponse = serde_json::from_str(payload)
                            .map_err(|err| LlmError::transport(err.to_string()))?;

                        if let Some(choice) = parsed.choices.first() {
                            if let Some(content) = &choice.delta.content {
                                if !content.is_empty() {
                                    yield StreamChunk::content_delta(content.clone());
                                }
                            }

                            if let Some(delta_calls) = &choice.delta.tool_calls {
                                for delta_call in delta_calls {
                                    let index = delta_call.index.unwrap_or(0);
                                    let entry = tool_calls.entry(index).or_insert_with(|| {
                                        ToolCall::new(
                                            delta_call
                                                .id
                                                .clone()
                                                .unwrap_or_else(|| format!("call_{index}")),
                                            "",
                                            "",
                                        )
                                    });

                                    if let Some(id) = &delta_call.id {
                                        entry.id = id.clone();
                                    }

                                    if let Some(function) = &delta_call.function {
                                        if let Some(name) = &function.name {
                                            entry.function.name = name.clone();
                                        }

                                        if let Some(arguments) = &function.arguments {
                                            entry.function.arguments.push_str(arguments);
                                        }
                                    }

                                    // Yields the accumulated state; the last
                                    // chunk per index carries the full call.
                                    yield StreamChunk::tool_call_delta(entry.clone());
                                }
                            }

                            if let Some(reason) = choice.finish_reason.as_deref() {
                                finish_reason = Some(parse_finish_reason(reason));
                            }
                        }
                    }

                    if finished {
                        break;
                    }
                }

                let reason = finish_reason.unwrap_or(FinishReason::Stop);
                debug!(?reason, tool_calls = tool_calls.len(), "chat stream finished");

                let kind = if reason == FinishReason::ToolUse {
                    ChunkKind::ToolCall
                } else {
                    ChunkKind::Content
                };
                yield StreamChunk {
                    kind,
                    content: None,
                    tool_call: None,
                    finish_reason: Some(reason),
                };
            };

            Ok(Box::pin(stream) as BoxedChunkStream<'a>)
        })
    }
}

/// One model behind one OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    transport: Arc<dyn ChatTransport>,
    model: String,
    credentials: ProviderCredentials,
}

impl OpenAiCompatProvider {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        model: impl Into<String>,
        credentials: ProviderCredentials,
    ) -> Self {
        Self {
            transport,
            model: model.into(),
            credentials,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
        stream: bool,
    ) -> Result<ChatRequest, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::invalid_request(
                "chat request requires at least one message",
            ));
        }

        Ok(ChatRequest {
            model: self.model.clone(),
            messages,
            tools: tools.filter(|tools| !tools.is_empty()),
            stream,
        })
    }
}

impl LanguageModel for OpenAiCompatProvider {
    fn complete<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>> {
        Box::pin(async move {
            let request = self.build_request(messages, tools, false)?;
            self.transport.complete(request, &self.credentials.api_key).await
        })
    }

    fn stream<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>> {
        Box::pin(async move {
            let request = self.build_request(messages, tools, true)?;
            self.transport.stream(request, &self.credentials.api_key).await
        })
    }
}

fn parse_finish_reason(value: &str) -> FinishReason {
    match value {
        "stop" => FinishReason::Stop,
        "tool_calls" => FinishReason::ToolUse,
        "length" => FinishReason::MaxTokens,
        _ => FinishReason::Error,
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiAssistantMessage,
}

#[derive(Debug, Deserialize)]
struct ApiAssistantMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

impl TryFrom<ApiResponse> for ModelResponse {
    type Error = LlmError;

    fn try_from(value: ApiResponse) -> Result<Self, Self::Error> {
        let choice = value
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::transport("chat response did not include choices"))?;

        let message = Message::assistant_with_tool_calls(
            choice.message.content.unwrap_or_default(),
            choice.message.tool_calls.unwrap_or_default(),
        );

        Ok(ModelResponse::new(message))
    }
}

#[derive(Debug, Deserialize)]
struct ApiStreamResponse {
    choices: Vec<ApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChoice {
    delta: ApiStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ApiDeltaToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiDeltaToolCall {
    index: Option<u32>,
    id: Option<String>,
    function: Option<ApiDeltaToolFunction>,
}

#[derive(Debug, Deserialize)]
struct ApiDeltaToolFunction {
    name: Option<String>,
    arguments: Option<String>,
}
