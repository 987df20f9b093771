//! LLM provider abstraction layer.
//!
//! A trait-based abstraction over LLM backends (Ollama, OpenAI-compatible APIs)
//! used by the extraction and interpretation oracles.

mod ollama;
mod openai;
mod provider;
mod types;

pub use ollama::OllamaProvider;
pub use openai::{ApiKeySource, OpenAIProvider};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
