//! Common imports for most prism applications.

pub use crate::{AutoModel, AutoModelBuilder, ToolCallMode};
pub use crate::{pr_messages, pr_msg};
pub use crate::{
    ChunkKind, ContentPart, FinishReason, LanguageModel, LlmError, LlmErrorKind, Message,
    MessageContent, ModelCapability, ModelResponse, Preference, PromptToolEmulator, Role,
    StreamChunk, ToolCall, ToolDefinition, available_models, capability, select,
};
