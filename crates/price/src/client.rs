//! Price lookups with explicit caching and pacing

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{PriceCache, PriceKey};
use crate::feed::PriceFeed;
use crate::limiter::RateLimiter;
use crate::PriceError;

/// Outcome of a price lookup, as served to callers and as cached
#[derive(Debug, Clone, PartialEq)]
pub enum PriceQuote {
    /// Exchange rate for the requested pair
    Rate(f64),
    /// The upstream could not provide a rate
    Unavailable(FailureReason),
}

impl PriceQuote {
    /// The rate, if the lookup succeeded
    pub fn rate(&self) -> Option<f64> {
        match self {
            PriceQuote::Rate(rate) => Some(*rate),
            PriceQuote::Unavailable(_) => None,
        }
    }
}

/// Why a lookup failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Upstream returned HTTP 429
    UpstreamRateLimited,
    /// Any other upstream failure (network, non-200, malformed body)
    UpstreamError(String),
}

/// Client for the external price service.
///
/// Sequencing is explicit: check cache, pace the call, fetch, store. Failure
/// outcomes are stored exactly like successes, so a failed lookup is not
/// retried until its cache entry expires.
pub struct CryptoPriceClient {
    feed: Arc<dyn PriceFeed>,
    cache: PriceCache<PriceQuote>,
    limiter: RateLimiter,
}

impl CryptoPriceClient {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        cache_ttl: Duration,
        cache_capacity: usize,
        min_call_spacing: Duration,
    ) -> Self {
        Self {
            feed,
            cache: PriceCache::new(cache_ttl, cache_capacity),
            limiter: RateLimiter::new(min_call_spacing),
        }
    }

    /// Current rate for (asset, fiat), served from cache when fresh.
    ///
    /// Never returns an error: failures are quote values the caller renders
    /// as "could not retrieve".
    pub async fn get_price(&self, asset: &str, fiat: &str) -> PriceQuote {
        let key = PriceKey::new(asset, fiat);
        if let Some(quote) = self.cache.get(&key) {
            tracing::debug!(asset, fiat, "price cache hit");
            return quote;
        }

        self.limiter.acquire().await;

        let quote = match self.feed.fetch_rate(asset, fiat).await {
            Ok(rate) => {
                tracing::debug!(asset, fiat, rate, source = self.feed.source_name(), "fetched rate");
                PriceQuote::Rate(rate)
            }
            Err(PriceError::RateLimited) => {
                tracing::warn!(asset, fiat, source = self.feed.source_name(), "upstream rate limited");
                PriceQuote::Unavailable(FailureReason::UpstreamRateLimited)
            }
            Err(err) => {
                tracing::warn!(asset, fiat, error = %err, "price lookup failed");
                PriceQuote::Unavailable(FailureReason::UpstreamError(err.to_string()))
            }
        };

        self.cache.put(key, quote.clone());
        quote
    }
}
