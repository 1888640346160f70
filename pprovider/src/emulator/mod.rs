//! Prompt-based tool-calling emulation for backends without native support.
//!
//! [`PromptToolEmulator`] wraps any [`LanguageModel`] and implements the same
//! trait, so callers cannot tell an emulated backend from a native one: tool
//! definitions go in, structured tool calls come out. Under the hood the
//! tools are rendered into a system prompt, the backend is invoked without
//! tool support, and its free-form text is parsed back into calls.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pprovider::{LanguageModel, PromptToolEmulator};
//!
//! fn wrap(backend: Arc<dyn LanguageModel>) -> PromptToolEmulator {
//!     PromptToolEmulator::new(backend)
//! }
//! ```

mod parser;
mod prompt;

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use tracing::debug;

use crate::{
    BoxedChunkStream, LanguageModel, LlmError, Message, ModelFuture, ModelResponse, StreamChunk,
    ToolDefinition,
};

pub use parser::{extract_structured, parse_output, to_tool_calls};

pub struct PromptToolEmulator {
    inner: Arc<dyn LanguageModel>,
}

impl PromptToolEmulator {
    pub fn new(inner: Arc<dyn LanguageModel>) -> Self {
        Self { inner }
    }
}

/// Treats `Some(vec![])` the same as `None`: no tools, no emulation.
fn active_tools(tools: Option<Vec<ToolDefinition>>) -> Option<Vec<ToolDefinition>> {
    tools.filter(|tools| !tools.is_empty())
}

impl LanguageModel for PromptToolEmulator {
    fn complete<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>> {
        Box::pin(async move {
            let Some(tools) = active_tools(tools) else {
                return self.inner.complete(messages, None).await;
            };

            let prompted = prompt::with_tool_instructions(&messages, &tools);
            let response = self.inner.complete(prompted, None).await?;

            let (tool_calls, leftover) = parser::parse_output(&response.message.content);
            debug!(
                tool_calls = tool_calls.len(),
                has_text = leftover.is_some(),
                "parsed emulated completion"
            );

            let message = if tool_calls.is_empty() {
                Message::assistant(leftover.unwrap_or_default())
            } else {
                Message::assistant_with_tool_calls("", tool_calls)
            };

            Ok(ModelResponse::new(message))
        })
    }

    fn stream<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>> {
        Box::pin(async move {
            let Some(tools) = active_tools(tools) else {
                return self.inner.stream(messages, None).await;
            };

            let prompted = prompt::with_tool_instructions(&messages, &tools);
            let mut inner = self.inner.stream(prompted, None).await?;

            // The whole answer must be buffered before parsing: a tool call
            // is only recognizable once its JSON is complete, so nothing can
            // be forwarded incrementally without risking a half-emitted call.
            let stream = try_stream! {
                let mut buffered = String::new();
                while let Some(chunk) = inner.next().await {
                    let chunk = chunk?;
                    if let Some(content) = chunk.content {
                        buffered.push_str(&content);
                    }
                }

                let buffered_bytes = buffered.len();
                let (tool_calls, leftover) = parser::parse_output(&buffered.into());
                debug!(
                    tool_calls = tool_calls.len(),
                    buffered_bytes,
                    "parsed emulated stream"
                );

                if tool_calls.is_empty() {
                    let text = leftover.unwrap_or_default();
                    if !text.is_empty() {
                        yield StreamChunk::content_done(text);
                    }
                } else {
                    for tool_call in tool_calls {
                        yield StreamChunk::tool_call_delta(tool_call);
                    }
                    yield StreamChunk::tool_use_done();
                }
            };

            Ok(Box::pin(stream) as BoxedChunkStream<'a>)
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{ChunkKind, FinishReason, Role, ToolCall, VecChunkStream};

    use super::*;

    /// Replays a scripted answer and records what it was asked.
    struct ScriptedModel {
        answer: String,
        seen: std::sync::Mutex<Vec<(Vec<Message>, Option<Vec<ToolDefinition>>)>>,
    }

    impl ScriptedModel {
        fn new(answer: impl Into<String>) -> Self {
            Self {
                answer: answer.into(),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> (Vec<Message>, Option<Vec<ToolDefinition>>) {
            self.seen.lock().unwrap().last().cloned().expect("a request was made")
        }
    }

    impl LanguageModel for ScriptedModel {
        fn complete<'a>(
            &'a self,
            messages: Vec<Message>,
            tools: Option<Vec<ToolDefinition>>,
        ) -> ModelFuture<'a, Result<ModelResponse, LlmError>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push((messages, tools));
                Ok(ModelResponse::new(Message::assistant(self.answer.clone())))
            })
        }

        fn stream<'a>(
            &'a self,
            messages: Vec<Message>,
            tools: Option<Vec<ToolDefinition>>,
        ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push((messages, tools));
                // Split the scripted answer into small deltas.
                let chunks = self
                    .answer
                    .as_bytes()
                    .chunks(5)
                    .map(|piece| {
                        Ok(StreamChunk::content_delta(
                            String::from_utf8_lossy(piece).into_owned(),
                        ))
                    })
                    .collect();
                Ok(Box::pin(VecChunkStream::new(chunks)) as BoxedChunkStream<'a>)
            })
        }
    }

    fn weather_tool() -> ToolDefinition {
        ToolDefinition::new(
            "get_weather",
            "Look up the current weather",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )
    }

    #[tokio::test]
    async fn complete_without_tools_passes_through_unchanged() {
        let backend = Arc::new(ScriptedModel::new("plain answer"));
        let emulator = PromptToolEmulator::new(backend.clone());

        let response = emulator
            .complete(vec![Message::user("hi")], None)
            .await
            .expect("completion");
        assert_eq!(response.message.content.text_concat(), "plain answer");

        let (messages, tools) = backend.last_request();
        assert_eq!(messages, vec![Message::user("hi")]);
        assert!(tools.is_none());
    }

    #[tokio::test]
    async fn empty_tool_list_is_treated_as_no_tools() {
        let backend = Arc::new(ScriptedModel::new("plain answer"));
        let emulator = PromptToolEmulator::new(backend.clone());

        emulator
            .complete(vec![Message::user("hi")], Some(Vec::new()))
            .await
            .expect("completion");

        let (messages, _) = backend.last_request();
        // No synthesized system prompt.
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn complete_with_tools_prepends_instructions_and_strips_tools() {
        let backend = Arc::new(ScriptedModel::new("sure"));
        let emulator = PromptToolEmulator::new(backend.clone());

        emulator
            .complete(vec![Message::user("weather?")], Some(vec![weather_tool()]))
            .await
            .expect("completion");

        let (messages, tools) = backend.last_request();
        assert!(tools.is_none());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.text_concat().contains("get_weather"));
        assert_eq!(messages[1], Message::user("weather?"));
    }

    #[tokio::test]
    async fn complete_turns_json_answers_into_tool_calls() {
        let backend = Arc::new(ScriptedModel::new(
            r#"{"name":"get_weather","arguments":{"city":"Berlin"}}"#,
        ));
        let emulator = PromptToolEmulator::new(backend);

        let response = emulator
            .complete(vec![Message::user("weather?")], Some(vec![weather_tool()]))
            .await
            .expect("completion");

        let message = response.message;
        assert_eq!(message.role, Role::Assistant);
        assert!(message.content.is_empty());

        let calls = message.tool_calls.expect("tool calls");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ToolCall::new("call_0", "get_weather", r#"{"city":"Berlin"}"#));
    }

    #[tokio::test]
    async fn complete_keeps_prose_answers_as_text() {
        let backend = Arc::new(ScriptedModel::new("It's sunny today."));
        let emulator = PromptToolEmulator::new(backend);

        let response = emulator
            .complete(vec![Message::user("weather?")], Some(vec![weather_tool()]))
            .await
            .expect("completion");

        assert_eq!(response.message.content.text_concat(), "It's sunny today.");
        assert!(response.message.tool_calls.is_none());
    }

    #[tokio::test]
    async fn stream_with_tools_reassembles_calls_from_deltas() {
        let backend = Arc::new(ScriptedModel::new(
            r#"{"name":"get_weather","arguments":{"city":"Berlin"}}"#,
        ));
        let emulator = PromptToolEmulator::new(backend);

        let mut stream = emulator
            .stream(vec![Message::user("weather?")], Some(vec![weather_tool()]))
            .await
            .expect("stream");

        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.expect("chunk"));
        }

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].kind, ChunkKind::ToolCall);
        let call = chunks[0].tool_call.as_ref().expect("tool call");
        assert_eq!(call.function.name, "get_weather");
        assert_eq!(chunks[1].finish_reason, Some(FinishReason::ToolUse));
        assert!(chunks.iter().all(|chunk| chunk.content.is_none()));
    }

    #[tokio::test]
    async fn stream_with_tools_emits_prose_as_one_terminal_chunk() {
        let backend = Arc::new(ScriptedModel::new("It's sunny today."));
        let emulator = PromptToolEmulator::new(backend);

        let mut stream = emulator
            .stream(vec![Message::user("weather?")], Some(vec![weather_tool()]))
            .await
            .expect("stream");

        let first = stream.next().await.expect("one chunk").expect("ok");
        assert_eq!(first.content.as_deref(), Some("It's sunny today."));
        assert_eq!(first.finish_reason, Some(FinishReason::Stop));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_without_tools_passes_deltas_through() {
        let backend = Arc::new(ScriptedModel::new("hello world"));
        let emulator = PromptToolEmulator::new(backend);

        let mut stream = emulator
            .stream(vec![Message::user("hi")], None)
            .await
            .expect("stream");

        let mut text = String::new();
        let mut count = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.expect("chunk");
            text.push_str(chunk.content.as_deref().unwrap_or_default());
            count += 1;
        }

        assert_eq!(text, "hello world");
        assert!(count > 1, "passthrough should preserve delta granularity");
    }
}
