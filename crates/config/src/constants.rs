//! Centralized constants for the chat agent
//!
//! Single source of truth for pacing, caching and generation defaults used
//! across the workspace. Values that need to differ per deployment are
//! surfaced in `Settings` with these as defaults.

/// Outbound price-service pacing and caching
pub mod pricing {
    /// Minimum spacing between consecutive price-service calls (seconds)
    pub const RATE_LIMIT_SECONDS: u64 = 1;

    /// Validity window of a cached exchange rate (seconds)
    pub const CACHE_TTL_SECONDS: u64 = 300;

    /// Maximum number of distinct (asset, fiat) cache entries
    pub const CACHE_MAX_ENTRIES: usize = 100;
}

/// Completion-backend generation parameters
pub mod completion {
    /// Maximum tokens requested per completion
    pub const MAX_TOKENS: usize = 150;

    /// Sampling temperature
    pub const TEMPERATURE: f32 = 0.7;
}

/// Conversation transcript bounds
pub mod conversation {
    /// Number of most-recent turns included in the completion transcript
    pub const CONTEXT_WINDOW_TURNS: usize = 10;
}

/// Service endpoints (defaults; override via settings)
pub mod endpoints {
    /// CoinAPI price service
    pub const COINAPI_DEFAULT: &str = "https://rest.coinapi.io";

    /// Together AI chat completions
    pub const TOGETHER_DEFAULT: &str = "https://api.together.xyz/v1";

    /// Translation service (LibreTranslate-compatible)
    pub const TRANSLATE_DEFAULT: &str = "http://localhost:5000";
}

/// Request timeouts (milliseconds)
pub mod timeouts {
    /// Price lookup request timeout (ms)
    pub const PRICE_REQUEST_MS: u64 = 5_000;

    /// Completion request timeout (ms)
    pub const COMPLETION_REQUEST_MS: u64 = 30_000;

    /// Translation request timeout (ms)
    pub const TRANSLATION_REQUEST_MS: u64 = 5_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_bounds_reasonable() {
        assert!(pricing::CACHE_TTL_SECONDS > 0);
        assert!(pricing::CACHE_MAX_ENTRIES > 0);
    }

    #[test]
    fn test_temperature_in_range() {
        assert!(completion::TEMPERATURE >= 0.0 && completion::TEMPERATURE <= 2.0);
    }

    #[test]
    fn test_context_window_nonzero() {
        assert!(conversation::CONTEXT_WINDOW_TURNS > 0);
    }
}
