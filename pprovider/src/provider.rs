use std::future::Future;
use std::pin::Pin;

use crate::{BoxedChunkStream, LlmError, Message, ModelResponse, ToolDefinition};

pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The model invocation port: send messages, get a completion or a stream.
///
/// `tools: None` means no tool support is requested for this call. Backends
/// with native tool-calling honor `Some(tools)` directly; backends without it
/// are wrapped in [`PromptToolEmulator`](crate::PromptToolEmulator), which
/// implements this same trait so the two are substitutable for one another
/// (an emulator can even wrap another emulator).
pub trait LanguageModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<ModelResponse, LlmError>>;

    fn stream<'a>(
        &'a self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> ModelFuture<'a, Result<BoxedChunkStream<'a>, LlmError>>;
}
