//! Text processing for the chat agent
//!
//! This crate provides the two cheap, synchronous-or-adapter stages that run
//! before a message is routed:
//! - **Intent detection**: classify a message as a language-change request,
//!   a price lookup (with resolved asset/fiat pair), or a general query
//! - **Translation**: detect the input language and normalize non-English
//!   text to English, with a silent fallback to the original text

pub mod intent;
pub mod translation;

pub use intent::{ParsedQuery, QueryParser, DEFAULT_FIAT};
pub use translation::{
    HttpTranslator, HttpTranslatorConfig, NoopTranslator, TranslationError, Translator,
};
