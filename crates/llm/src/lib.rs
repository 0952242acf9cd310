//! LLM integration for the chat agent
//!
//! Features:
//! - Pluggable completion backends behind the [`LlmBackend`] trait
//! - Together AI backend (OpenAI-compatible chat-completions wire format)
//! - [`CompletionClient`] with a terminal fallback reply

pub mod backend;
pub mod completion;
pub mod together;

pub use backend::{FinishReason, GenerationResult, LlmBackend};
pub use completion::{CompletionClient, FALLBACK_REPLY};
pub use together::{TogetherBackend, TogetherConfig};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}
