//! Completion client with a terminal fallback

use std::sync::Arc;

use chat_agent_core::Message;

use crate::backend::LlmBackend;

/// Fixed reply used when the completion backend fails
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process your request at the moment.";

/// Wraps a backend and converts every failure into the fixed apology string.
///
/// Network errors, non-200 responses, malformed bodies and empty generations
/// all collapse to [`FALLBACK_REPLY`]. This is a terminal fallback, not a
/// retry.
pub struct CompletionClient {
    backend: Arc<dyn LlmBackend>,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Generate a reply for the bounded transcript
    pub async fn complete(&self, transcript: &[Message]) -> String {
        let estimated_tokens: usize = transcript
            .iter()
            .map(|m| self.backend.estimate_tokens(&m.content))
            .sum();
        tracing::debug!(
            turns = transcript.len(),
            estimated_tokens,
            model = self.backend.model_name(),
            "requesting completion"
        );

        match self.backend.generate(transcript).await {
            Ok(result) if !result.text.trim().is_empty() => {
                tracing::debug!(
                    tokens = result.tokens,
                    total_time_ms = result.total_time_ms,
                    "completion generated"
                );
                result.text.trim().to_string()
            }
            Ok(_) => {
                tracing::warn!(
                    model = self.backend.model_name(),
                    "completion returned empty text, using fallback reply"
                );
                FALLBACK_REPLY.to_string()
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    model = self.backend.model_name(),
                    "completion failed, using fallback reply"
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FinishReason, GenerationResult};
    use crate::LlmError;
    use async_trait::async_trait;

    struct FixedBackend {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn generate(&self, _messages: &[Message]) -> Result<GenerationResult, LlmError> {
            match &self.reply {
                Some(text) => Ok(GenerationResult {
                    text: text.clone(),
                    tokens: 0,
                    total_time_ms: 1,
                    finish_reason: FinishReason::Stop,
                }),
                None => Err(LlmError::Api("HTTP 500: boom".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_complete_trims_reply() {
        let client = CompletionClient::new(Arc::new(FixedBackend {
            reply: Some("  Why did the chicken cross the road?  ".to_string()),
        }));
        let reply = client.complete(&[Message::user("Tell me a joke")]).await;
        assert_eq!(reply, "Why did the chicken cross the road?");
    }

    #[tokio::test]
    async fn test_backend_error_yields_fallback() {
        let client = CompletionClient::new(Arc::new(FixedBackend { reply: None }));
        let reply = client.complete(&[Message::user("hi")]).await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_generation_yields_fallback() {
        let client = CompletionClient::new(Arc::new(FixedBackend {
            reply: Some("   ".to_string()),
        }));
        let reply = client.complete(&[Message::user("hi")]).await;
        assert_eq!(reply, FALLBACK_REPLY);
    }
}
