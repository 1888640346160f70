//! Unified facade over the prism workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the provider layer and adds [`AutoModel`], which resolves a
//! concrete backend from a speed/quality preference (or a pinned model name)
//! and environment credentials, with tool calling native or prompt-emulated.
//!
//! ```rust,no_run
//! use prism::prelude::*;
//!
//! # async fn demo() -> Result<(), LlmError> {
//! let model = AutoModel::builder()
//!     .prefer(Preference::Speed)
//!     .tool_call_mode(ToolCallMode::Prompt)
//!     .build()?;
//!
//! let messages = pr_messages![
//!     system => "You are concise.",
//!     user => "What's 2 + 2?",
//! ];
//! let response = model.complete(messages, None).await?;
//! println!("{}", response.message.content.text_concat());
//! # Ok(())
//! # }
//! ```

mod auto;
mod macros;

pub mod prelude;

pub use pprovider;

pub use pprovider::{
    BoxedChunkStream, ChatRequest, ChatTransport, ChunkKind, ChunkStream, ContentPart,
    FinishReason, FunctionCall, FunctionSpec, HttpChatTransport, LanguageModel, LlmError,
    LlmErrorKind, MODEL_CATALOG, Message, MessageContent, ModelCapability, ModelFuture,
    ModelResponse, OpenAiCompatProvider, Preference, PromptToolEmulator, ProviderCredentials,
    ProviderKind, Role, SecretString, StreamChunk, ToolCall, ToolDefinition, ToolType,
    VecChunkStream, available_models, capability, select,
};

pub use auto::{AutoModel, AutoModelBuilder, ToolCallMode};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn pr_msg_macro_creates_expected_message() {
        let message = crate::pr_msg!(user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content.text_concat(), "hello");
    }

    #[test]
    fn pr_messages_macro_builds_message_vector() {
        let messages = crate::pr_messages![
            system => "You are concise.",
            user => "Summarize the repo",
        ];

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }
}
