use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use pprovider::{
    BoxedChunkStream, ChatRequest, ChatTransport, FinishReason, LanguageModel, LlmError,
    LlmErrorKind, Message, ModelFuture, ModelResponse, OpenAiCompatProvider, ProviderCredentials,
    Role, SecretString, StreamChunk, ToolCall, ToolDefinition, VecChunkStream,
};
use serde_json::json;

#[derive(Debug, Default)]
struct FakeTransport {
    captured_key: Mutex<Option<String>>,
    captured_request: Mutex<Option<ChatRequest>>,
}

impl FakeTransport {
    fn capture(&self, request: ChatRequest, api_key: &SecretString) {
        *self.captured_request.lock().expect("request lock") = Some(request);
        *self.captured_key.lock().expect("key lock") = Some(api_key.expose().to_string());
    }

    fn request(&self) -> ChatRequest {
        self.captured_request
            .lock()
            .expect("request lock")
            .clone()
            .expect("request should be captured")
    }
}

impl ChatTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a SecretString,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>> {
        Box::pin(async move {
            self.capture(request, api_key);
            Ok(ModelResponse::new(Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "lookup", "{\"id\":1}")],
            )))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a SecretString,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>> {
        Box::pin(async move {
            self.capture(request, api_key);
            let chunks = vec![
                Ok(StreamChunk::content_delta("hello")),
                Ok(StreamChunk::content_delta(" world")),
                Ok(StreamChunk::content_done("")),
            ];
            Ok(Box::pin(VecChunkStream::new(chunks)) as BoxedChunkStream<'a>)
        })
    }
}

fn provider(transport: Arc<FakeTransport>) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(
        transport,
        "qwen-turbo",
        ProviderCredentials::new("key-xyz", "https://example.com/compat/v1"),
    )
}

#[tokio::test]
async fn complete_carries_model_tools_and_credentials_to_the_transport() {
    let transport = Arc::new(FakeTransport::default());
    let target = provider(transport.clone());

    let tools = vec![ToolDefinition::new(
        "lookup",
        "Look up an ID",
        json!({"type": "object", "properties": {"id": {"type": "integer"}}}),
    )];
    let response = target
        .complete(vec![Message::user("find 1")], Some(tools))
        .await
        .expect("completion should succeed");

    assert_eq!(response.message.role, Role::Assistant);
    let calls = response.message.tool_calls.expect("tool calls");
    assert_eq!(calls[0].function.name, "lookup");

    let request = transport.request();
    assert_eq!(request.model, "qwen-turbo");
    assert!(!request.stream);
    assert_eq!(request.tools.as_ref().map(Vec::len), Some(1));

    let key = transport.captured_key.lock().expect("key lock").clone();
    assert_eq!(key.as_deref(), Some("key-xyz"));
}

#[tokio::test]
async fn stream_marks_the_request_as_streaming() {
    let transport = Arc::new(FakeTransport::default());
    let target = provider(transport.clone());

    let mut stream = target
        .stream(vec![Message::user("hi")], None)
        .await
        .expect("stream should open");

    let mut text = String::new();
    let mut finish = None;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("chunk should be ok");
        text.push_str(chunk.content.as_deref().unwrap_or_default());
        finish = chunk.finish_reason;
    }

    assert_eq!(text, "hello world");
    assert_eq!(finish, Some(FinishReason::Stop));
    assert!(transport.request().stream);
}

#[tokio::test]
async fn empty_messages_never_reach_the_transport() {
    let transport = Arc::new(FakeTransport::default());
    let target = provider(transport.clone());

    let error = target
        .complete(Vec::new(), None)
        .await
        .expect_err("empty request should fail");
    assert_eq!(error.kind, LlmErrorKind::InvalidRequest);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}
