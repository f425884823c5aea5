//! LLM Backend abstraction layer.
//!
//! Provides a trait-based interface over the hosted models that write
//! divination narratives:
//! - OpenAI-compatible (OpenAI, vLLM, Ollama)
//! - Anthropic Messages API
//! - Mock backend for testing

pub mod anthropic;
pub mod mock;
pub mod openai;
pub mod traits;

pub use anthropic::AnthropicBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message, MessageRole,
    ModelCapabilities, Usage,
};
