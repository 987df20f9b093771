//! LLM-backed oracles for the discover pipeline.
//!
//! This module provides:
//! - LLM provider abstraction (Ollama and OpenAI-compatible backends)
//! - Entity extraction and preference interpretation oracles built on it

pub mod llm;
pub mod oracles;

pub use llm::{
    CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message, MessageRole,
    OllamaProvider, OpenAIProvider,
};
pub use oracles::{
    seed_attributes, EntityExtractor, LlmEntityExtractor, LlmPreferenceInterpreter,
    PreferenceInterpreter,
};
