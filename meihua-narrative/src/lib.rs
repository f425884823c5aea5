//! Meihua Narrative - LLM-written readings for divination results
//!
//! Provides:
//! - Trait-based LLM backends (Anthropic Messages, OpenAI-compatible, mock)
//! - Prompt assembly from a [`meihua_core::DivinationResult`]
//! - A service that picks the first available backend and scores the reply
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           NarrativeService              │
//! │  (DivinationResult → Narrative)         │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌───────────────┐
//! │ LlmBackend  │       │PromptAssembler│
//! │ (Anthropic/ │       │               │
//! │  OpenAI)    │       │               │
//! └─────────────┘       └───────────────┘
//! ```

pub mod backend;
pub mod prompt;
pub mod service;
pub mod types;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{AnthropicBackend, MockBackend, OpenAiBackend};
pub use prompt::PromptAssembler;
pub use service::{NarrativeError, NarrativeService};
pub use types::*;
