//! Query intent detection
//!
//! Pure, case-insensitive classification of a user message into one of three
//! handling paths. Language-change phrases take precedence over everything
//! else; a recognized asset term makes the message a price lookup.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed phrases that signal a language-change request
const LANGUAGE_CHANGE_PHRASES: [&str; 3] = ["switch to", "change language to", "speak in"];

/// Fiat code used when no fiat term is present
pub const DEFAULT_FIAT: &str = "USD";

static ASSET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bitcoin|btc|ethereum|eth|litecoin|ltc)\b").expect("asset pattern compiles")
});

static FIAT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(usd|dollars?|eur|euros?|inr|rupees?|gbp|pounds?|aud|cad|jpy|yen|cny|yuan)\b",
    )
    .expect("fiat pattern compiles")
});

/// Result of parsing one message. Derived, stateless, recomputed per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedQuery {
    /// Message contains a language-change phrase (highest precedence)
    LanguageChange,
    /// Message names a recognized asset; fiat defaults to USD
    PriceLookup {
        asset: &'static str,
        fiat: &'static str,
    },
    /// Everything else goes to the completion backend
    General,
}

/// Case-insensitive query classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// Classify one message.
    ///
    /// A message containing both a language-change phrase and a crypto term
    /// resolves as a language change; the precedence is a policy decision,
    /// not an accident of evaluation order.
    pub fn parse(&self, text: &str) -> ParsedQuery {
        if Self::is_language_change(text) {
            return ParsedQuery::LanguageChange;
        }

        let Some(asset) = Self::find_asset(text) else {
            return ParsedQuery::General;
        };
        let fiat = Self::find_fiat(text).unwrap_or(DEFAULT_FIAT);

        ParsedQuery::PriceLookup { asset, fiat }
    }

    fn is_language_change(text: &str) -> bool {
        let lowered = text.to_lowercase();
        LANGUAGE_CHANGE_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
    }

    /// Leftmost whole-word asset term, mapped to its canonical symbol
    fn find_asset(text: &str) -> Option<&'static str> {
        ASSET_PATTERN
            .find(text)
            .map(|m| match m.as_str().to_lowercase().as_str() {
                "bitcoin" | "btc" => "BTC",
                "ethereum" | "eth" => "ETH",
                "litecoin" | "ltc" => "LTC",
                other => unreachable!("asset pattern matched {}", other),
            })
    }

    /// Leftmost whole-word fiat term, mapped to its canonical code
    fn find_fiat(text: &str) -> Option<&'static str> {
        FIAT_PATTERN
            .find(text)
            .map(|m| match m.as_str().to_lowercase().as_str() {
                "usd" | "dollar" | "dollars" => "USD",
                "eur" | "euro" | "euros" => "EUR",
                "inr" | "rupee" | "rupees" => "INR",
                "gbp" | "pound" | "pounds" => "GBP",
                "aud" => "AUD",
                "cad" => "CAD",
                "jpy" | "yen" => "JPY",
                "cny" | "yuan" => "CNY",
                other => unreachable!("fiat pattern matched {}", other),
            })
    }
}
