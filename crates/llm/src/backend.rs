//! Completion backend abstraction

use async_trait::async_trait;

use chat_agent_core::Message;

use crate::LlmError;

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens generated (0 when the backend does not report usage)
    pub tokens: usize,
    /// Total generation time (ms)
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
}

/// Completion backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a reply for the given transcript
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Estimate tokens (rough: ~4 graphemes per token for English text)
    fn estimate_tokens(&self, text: &str) -> usize {
        use unicode_segmentation::UnicodeSegmentation;

        text.graphemes(true).count().max(1) / 4
    }
}
