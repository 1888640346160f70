//! Unified language-model access with prompt-emulated tool calling.
//!
//! The crate is built around one port, [`LanguageModel`]: send messages, get
//! back a completion or a chunk stream. [`OpenAiCompatProvider`] implements
//! it over any OpenAI-compatible chat endpoint, and [`PromptToolEmulator`]
//! wraps any implementation to add tool calling to backends that lack it,
//! by prompting for JSON and parsing it back out of whatever text returns.
//! [`select`] and the [`MODEL_CATALOG`] pick a concrete backend from a
//! speed/quality preference.
//!
//! ```rust
//! use pprovider::{Message, Preference, select};
//!
//! let picked = select(Preference::Quality, false).expect("catalog is non-empty");
//! let _conversation = vec![
//!     Message::system("You are terse."),
//!     Message::user("Summarize Rust in one sentence."),
//! ];
//! assert!(!picked.model_name.is_empty());
//! ```

mod adapters;
mod catalog;
mod credentials;
mod emulator;
mod error;
mod model;
mod provider;
mod stream;

pub use adapters::{ChatRequest, ChatTransport, HttpChatTransport, OpenAiCompatProvider};
pub use catalog::{
    MODEL_CATALOG, ModelCapability, Preference, ProviderKind, available_models, capability,
    select, select_in,
};
pub use credentials::{ProviderCredentials, SecretString};
pub use emulator::{PromptToolEmulator, extract_structured, parse_output, to_tool_calls};
pub use error::{LlmError, LlmErrorKind};
pub use model::{
    ChunkKind, ContentPart, FinishReason, FunctionCall, FunctionSpec, Message, MessageContent,
    ModelResponse, Role, StreamChunk, ToolCall, ToolDefinition, ToolType,
};
pub use provider::{LanguageModel, ModelFuture};
pub use stream::{BoxedChunkStream, ChunkStream, VecChunkStream};
