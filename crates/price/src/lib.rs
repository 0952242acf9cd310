//! Rate-limited, cached access to the external price service
//!
//! Composition is explicit rather than decorator-style: the client holds a
//! [`RateLimiter`] and a [`PriceCache`] as collaborators and sequences them
//! itself (check cache → acquire limiter → call → store). Both are
//! process-wide shared state and safe under concurrent access.

pub mod cache;
pub mod client;
pub mod feed;
pub mod limiter;

pub use cache::{PriceCache, PriceKey};
pub use client::{CryptoPriceClient, FailureReason, PriceQuote};
pub use feed::{CoinApiConfig, CoinApiFeed, PriceFeed};
pub use limiter::RateLimiter;

use thiserror::Error;

/// Price service errors
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Upstream rate limit exceeded")]
    RateLimited,

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        PriceError::Network(err.to_string())
    }
}
