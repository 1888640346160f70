//! Backend adapters implementing [`LanguageModel`](crate::LanguageModel).

mod openai;

pub use openai::{ChatRequest, ChatTransport, HttpChatTransport, OpenAiCompatProvider};
