//! External price service adapter

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::PriceError;

/// Upstream exchange-rate source
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the current rate for one (asset, fiat) pair
    async fn fetch_rate(&self, asset: &str, fiat: &str) -> Result<f64, PriceError>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}

/// Configuration for the CoinAPI feed
#[derive(Debug, Clone)]
pub struct CoinApiConfig {
    /// API endpoint (for testing or proxy)
    pub endpoint: String,
    /// API key (from COINAPI_KEY or direct)
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for CoinApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://rest.coinapi.io".to_string(),
            api_key: std::env::var("COINAPI_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl CoinApiConfig {
    /// Create config with API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// CoinAPI exchange-rate feed
pub struct CoinApiFeed {
    config: CoinApiConfig,
    client: Client,
}

impl CoinApiFeed {
    /// Create a new feed
    pub fn new(config: CoinApiConfig) -> Result<Self, PriceError> {
        if config.api_key.is_empty() {
            return Err(PriceError::Configuration(
                "COINAPI_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PriceError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn rate_url(&self, asset: &str, fiat: &str) -> String {
        format!(
            "{}/v1/exchangerate/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            asset,
            fiat
        )
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    rate: f64,
}

#[async_trait]
impl PriceFeed for CoinApiFeed {
    async fn fetch_rate(&self, asset: &str, fiat: &str) -> Result<f64, PriceError> {
        let response = self
            .client
            .get(self.rate_url(asset, fiat))
            .header("X-CoinAPI-Key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: ExchangeRateResponse = response
            .json()
            .await
            .map_err(|e| PriceError::InvalidResponse(e.to_string()))?;

        Ok(body.rate)
    }

    fn source_name(&self) -> &str {
        "coinapi"
    }
}
