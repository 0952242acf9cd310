//! Message routing
//!
//! One message in, one reply out. The router decides the handling path from
//! the parsed intent, drives the collaborators, and appends the exchange to
//! the shared conversation. Per message the flow is
//! `Start → {LanguageChangeReply | PriceReply | GeneralReply} → Done`;
//! there are no retries at this layer.

use std::sync::Arc;

use chat_agent_core::{ConversationContext, Turn};
use chat_agent_llm::CompletionClient;
use chat_agent_price::{CryptoPriceClient, PriceQuote};
use chat_agent_text_processing::{ParsedQuery, QueryParser, Translator};

/// Fixed acknowledgment for language-change requests
pub const LANGUAGE_CHANGE_REPLY: &str =
    "I can understand your input in other languages, but I will respond in English.";

/// Routes each user message to a language-change acknowledgment, a price
/// lookup, or the completion backend.
///
/// Collaborators are injected once at startup; the router owns the session's
/// conversation log. All downstream failures have already been converted to
/// reply text by the adapters, so [`process`](Self::process) is infallible.
pub struct Router {
    parser: QueryParser,
    translator: Arc<dyn Translator>,
    prices: Arc<CryptoPriceClient>,
    completions: CompletionClient,
    conversation: ConversationContext,
    context_window: usize,
}

impl Router {
    pub fn new(
        translator: Arc<dyn Translator>,
        prices: Arc<CryptoPriceClient>,
        completions: CompletionClient,
        context_window: usize,
    ) -> Self {
        Self {
            parser: QueryParser::new(),
            translator,
            prices,
            completions,
            conversation: ConversationContext::new(),
            context_window,
        }
    }

    /// The session's conversation log (full history, for display)
    pub fn conversation(&self) -> &ConversationContext {
        &self.conversation
    }

    /// Handle one user message and return the reply
    pub async fn process(&self, text: &str) -> String {
        match self.parser.parse(text) {
            ParsedQuery::LanguageChange => {
                // Highest precedence; handled without any external call
                tracing::info!("language change requested");
                self.record_exchange(text, LANGUAGE_CHANGE_REPLY.to_string())
            }
            ParsedQuery::PriceLookup { asset, fiat } => {
                tracing::info!(asset, fiat, "price lookup requested");
                let reply = match self.prices.get_price(asset, fiat).await {
                    PriceQuote::Rate(rate) => {
                        format!("The current price of {} is {:.2} {}.", asset, rate, fiat)
                    }
                    PriceQuote::Unavailable(_) => {
                        format!("Sorry, I couldn't retrieve the price for {}.", asset)
                    }
                };
                self.record_exchange(text, reply)
            }
            ParsedQuery::General => self.handle_general(text).await,
        }
    }

    /// Append a (user, agent) pair for the canned paths, where the original
    /// user text is recorded and translation is skipped
    fn record_exchange(&self, user_text: &str, reply: String) -> String {
        self.conversation.append(Turn::user(user_text));
        self.conversation.append(Turn::agent(reply.clone()));
        reply
    }

    /// Translate → context → complete → context
    async fn handle_general(&self, text: &str) -> String {
        let input = match self.translator.detect_language(text).await {
            Ok(lang) if lang != "en" => {
                tracing::debug!(language = %lang, "translating input to English");
                self.translator.translate_to_english(text).await
            }
            Ok(_) => text.to_string(),
            Err(err) => {
                // A failed detection is treated as English input
                tracing::warn!(error = %err, "language detection failed, assuming English");
                text.to_string()
            }
        };

        self.conversation.append(Turn::user(input));
        let transcript = self.conversation.recent_transcript(self.context_window);
        let reply = self.completions.complete(&transcript).await;
        self.conversation.append(Turn::agent(reply.clone()));
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chat_agent_core::{Message, Role, Speaker};
    use chat_agent_llm::{FinishReason, GenerationResult, LlmBackend, LlmError};
    use chat_agent_price::{PriceError, PriceFeed};
    use chat_agent_text_processing::TranslationError;

    struct StubTranslator {
        language: &'static str,
        translated: &'static str,
        fail_detect: bool,
        detect_calls: AtomicUsize,
        translate_calls: AtomicUsize,
    }

    impl StubTranslator {
        fn english() -> Self {
            Self {
                language: "en",
                translated: "",
                fail_detect: false,
                detect_calls: AtomicUsize::new(0),
                translate_calls: AtomicUsize::new(0),
            }
        }

        fn foreign(language: &'static str, translated: &'static str) -> Self {
            Self {
                language,
                translated,
                fail_detect: false,
                detect_calls: AtomicUsize::new(0),
                translate_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Translator for StubTranslator {
        async fn detect_language(&self, _text: &str) -> Result<String, TranslationError> {
            self.detect_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_detect {
                return Err(TranslationError::Network("connection refused".to_string()));
            }
            Ok(self.language.to_string())
        }

        async fn translate_to_english(&self, text: &str) -> String {
            self.translate_calls.fetch_add(1, Ordering::SeqCst);
            if self.translated.is_empty() {
                text.to_string()
            } else {
                self.translated.to_string()
            }
        }

        fn service_name(&self) -> &str {
            "stub"
        }
    }

    struct StubFeed {
        rate: Option<f64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceFeed for StubFeed {
        async fn fetch_rate(&self, _asset: &str, _fiat: &str) -> Result<f64, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rate
                .ok_or_else(|| PriceError::Api("HTTP 502: bad gateway".to_string()))
        }

        fn source_name(&self) -> &str {
            "stub"
        }
    }

    struct RecordingBackend {
        reply: &'static str,
        transcripts: Mutex<Vec<Vec<Message>>>,
    }

    impl RecordingBackend {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                transcripts: Mutex::new(Vec::new()),
            }
        }

        fn last_transcript(&self) -> Vec<Message> {
            self.transcripts.lock().last().cloned().unwrap_or_default()
        }

        fn call_count(&self) -> usize {
            self.transcripts.lock().len()
        }
    }

    #[async_trait]
    impl LlmBackend for RecordingBackend {
        async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
            self.transcripts.lock().push(messages.to_vec());
            Ok(GenerationResult {
                text: self.reply.to_string(),
                tokens: 0,
                total_time_ms: 1,
                finish_reason: FinishReason::Stop,
            })
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct Fixture {
        translator: Arc<StubTranslator>,
        feed: Arc<StubFeed>,
        backend: Arc<RecordingBackend>,
        router: Router,
    }

    fn fixture(translator: StubTranslator, rate: Option<f64>, reply: &'static str) -> Fixture {
        let translator = Arc::new(translator);
        let feed = Arc::new(StubFeed {
            rate,
            calls: AtomicUsize::new(0),
        });
        let backend = Arc::new(RecordingBackend::new(reply));
        let prices = Arc::new(CryptoPriceClient::new(
            feed.clone(),
            Duration::from_secs(300),
            100,
            Duration::ZERO,
        ));
        let router = Router::new(
            translator.clone(),
            prices,
            CompletionClient::new(backend.clone()),
            10,
        );
        Fixture {
            translator,
            feed,
            backend,
            router,
        }
    }

    #[tokio::test]
    async fn test_language_change_precedence() {
        let f = fixture(StubTranslator::english(), Some(65000.0), "unused");

        let reply = f
            .router
            .process("switch to German and tell me the bitcoin price")
            .await;

        assert_eq!(reply, LANGUAGE_CHANGE_REPLY);
        // No external calls on this path
        assert_eq!(f.translator.detect_calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.feed.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.backend.call_count(), 0);

        let history = f.router.conversation().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].speaker, Speaker::User);
        assert_eq!(history[1].text, LANGUAGE_CHANGE_REPLY);
    }

    #[tokio::test]
    async fn test_price_lookup_reply() {
        let f = fixture(StubTranslator::english(), Some(5_000_000.0), "unused");

        let reply = f
            .router
            .process("What's the price of Bitcoin in rupees?")
            .await;

        assert_eq!(reply, "The current price of BTC is 5000000.00 INR.");
        assert_eq!(f.feed.calls.load(Ordering::SeqCst), 1);
        // Translation and completion are skipped on the price path
        assert_eq!(f.translator.detect_calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.backend.call_count(), 0);
        assert_eq!(f.router.conversation().turn_count(), 2);
    }

    #[tokio::test]
    async fn test_price_lookup_failure_reply() {
        let f = fixture(StubTranslator::english(), None, "unused");

        let reply = f.router.process("how much is eth?").await;

        assert_eq!(reply, "Sorry, I couldn't retrieve the price for ETH.");
        assert_eq!(f.router.conversation().turn_count(), 2);
    }

    #[tokio::test]
    async fn test_general_path_english() {
        let f = fixture(StubTranslator::english(), None, "Here is a joke.");

        let reply = f.router.process("Tell me a joke").await;

        assert_eq!(reply, "Here is a joke.");
        // Already English: no translation call
        assert_eq!(f.translator.translate_calls.load(Ordering::SeqCst), 0);

        // First message => one-turn transcript ending with the user text
        let transcript = f.backend.last_transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].content, "Tell me a joke");

        let history = f.router.conversation().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].speaker, Speaker::Agent);
    }

    #[tokio::test]
    async fn test_general_path_translates_foreign_input() {
        let f = fixture(
            StubTranslator::foreign("es", "Tell me something interesting"),
            None,
            "Okay.",
        );

        f.router.process("Cuéntame algo interesante").await;

        assert_eq!(f.translator.translate_calls.load(Ordering::SeqCst), 1);
        // The translated text is what enters the conversation
        let history = f.router.conversation().history();
        assert_eq!(history[0].text, "Tell me something interesting");
    }

    #[tokio::test]
    async fn test_detect_failure_falls_back_to_original() {
        let mut translator = StubTranslator::english();
        translator.fail_detect = true;
        let f = fixture(translator, None, "Okay.");

        f.router.process("hello there").await;

        assert_eq!(f.translator.translate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.router.conversation().history()[0].text, "hello there");
    }

    #[tokio::test]
    async fn test_transcript_is_windowed() {
        let f = fixture(StubTranslator::english(), None, "ack");

        for i in 0..15 {
            f.router.process(&format!("message number {}", i)).await;
        }

        // 15 exchanges = 30 stored turns, but the backend only ever sees 10
        assert_eq!(f.router.conversation().turn_count(), 30);
        let transcript = f.backend.last_transcript();
        assert_eq!(transcript.len(), 10);
        assert_eq!(transcript[9].content, "message number 14");
    }
}
