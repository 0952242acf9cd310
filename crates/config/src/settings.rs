//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{completion, endpoints, pricing, timeouts};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Price service configuration
    #[serde(default)]
    pub price: PriceServiceConfig,

    /// Completion service configuration
    #[serde(default)]
    pub completion: CompletionServiceConfig,

    /// Translation service configuration
    #[serde(default)]
    pub translation: TranslationServiceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings.
    ///
    /// Missing API keys are fatal: the server must refuse to start before
    /// accepting any request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_price()?;
        self.validate_completion()?;
        self.validate_translation()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.server.cors_enabled && self.server.cors_origins.is_empty() {
            tracing::warn!(
                "CORS is enabled but no origins are configured; defaulting to localhost only"
            );
        }

        Ok(())
    }

    fn validate_price(&self) -> Result<(), ConfigError> {
        let price = &self.price;

        if price.api_key.is_empty() {
            return Err(ConfigError::MissingField(
                "price.api_key (or COINAPI_KEY)".to_string(),
            ));
        }

        if price.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "price.cache_capacity".to_string(),
                message: "Cache capacity must be at least 1".to_string(),
            });
        }

        if price.cache_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "price.cache_ttl_seconds".to_string(),
                message: "Cache TTL must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_completion(&self) -> Result<(), ConfigError> {
        let completion = &self.completion;

        if completion.api_key.is_empty() {
            return Err(ConfigError::MissingField(
                "completion.api_key (or TOGETHER_API_KEY)".to_string(),
            ));
        }

        if completion.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "completion.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "completion.temperature".to_string(),
                message: format!(
                    "Must be between 0.0 and 2.0, got {}",
                    completion.temperature
                ),
            });
        }

        Ok(())
    }

    fn validate_translation(&self) -> Result<(), ConfigError> {
        if self.translation.enabled && self.translation.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "translation.endpoint".to_string(),
                message: "Endpoint required when translation is enabled".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: default_true(),
            // Empty by default - must be configured explicitly for production
            cors_origins: Vec::new(),
        }
    }
}

/// Price service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceServiceConfig {
    /// Price service endpoint
    #[serde(default = "default_price_endpoint")]
    pub endpoint: String,

    /// API key (also read from COINAPI_KEY)
    #[serde(default = "default_price_api_key")]
    pub api_key: String,

    /// Validity window of a cached rate (seconds)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Maximum number of distinct cached (asset, fiat) pairs
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Minimum spacing between upstream calls (seconds)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_seconds: u64,

    /// Request timeout (ms)
    #[serde(default = "default_price_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_price_endpoint() -> String {
    endpoints::COINAPI_DEFAULT.to_string()
}
fn default_price_api_key() -> String {
    std::env::var("COINAPI_KEY").unwrap_or_default()
}
fn default_cache_ttl() -> u64 {
    pricing::CACHE_TTL_SECONDS
}
fn default_cache_capacity() -> usize {
    pricing::CACHE_MAX_ENTRIES
}
fn default_rate_limit() -> u64 {
    pricing::RATE_LIMIT_SECONDS
}
fn default_price_timeout_ms() -> u64 {
    timeouts::PRICE_REQUEST_MS
}

impl Default for PriceServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_price_endpoint(),
            api_key: default_price_api_key(),
            cache_ttl_seconds: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            rate_limit_seconds: default_rate_limit(),
            timeout_ms: default_price_timeout_ms(),
        }
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionServiceConfig {
    /// Completion service endpoint (OpenAI-compatible)
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,

    /// API key (also read from TOGETHER_API_KEY)
    #[serde(default = "default_completion_api_key")]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout (ms)
    #[serde(default = "default_completion_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_completion_endpoint() -> String {
    endpoints::TOGETHER_DEFAULT.to_string()
}
fn default_completion_api_key() -> String {
    std::env::var("TOGETHER_API_KEY").unwrap_or_default()
}
fn default_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string()
}
fn default_max_tokens() -> usize {
    completion::MAX_TOKENS
}
fn default_temperature() -> f32 {
    completion::TEMPERATURE
}
fn default_completion_timeout_ms() -> u64 {
    timeouts::COMPLETION_REQUEST_MS
}

impl Default for CompletionServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_completion_endpoint(),
            api_key: default_completion_api_key(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_completion_timeout_ms(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationServiceConfig {
    /// Enable translation of non-English input
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Translation service endpoint (LibreTranslate-compatible)
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    /// API key (optional; many deployments run without one)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout (ms)
    #[serde(default = "default_translation_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_translation_endpoint() -> String {
    endpoints::TRANSLATE_DEFAULT.to_string()
}
fn default_translation_timeout_ms() -> u64 {
    timeouts::TRANSLATION_REQUEST_MS
}

impl Default for TranslationServiceConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_translation_endpoint(),
            api_key: None,
            timeout_ms: default_translation_timeout_ms(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (CHAT_AGENT prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CHAT_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_keys() -> Settings {
        let mut settings = Settings::default();
        settings.price.api_key = "coinapi-test-key".to_string();
        settings.completion.api_key = "together-test-key".to_string();
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.price.cache_ttl_seconds, 300);
        assert_eq!(settings.price.cache_capacity, 100);
        assert_eq!(settings.price.rate_limit_seconds, 1);
        assert_eq!(settings.completion.max_tokens, 150);
        assert_eq!(settings.completion.temperature, 0.7);
    }

    #[test]
    fn test_missing_api_keys_are_fatal() {
        let mut settings = settings_with_keys();
        settings.price.api_key = String::new();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingField(_))
        ));

        let mut settings = settings_with_keys();
        settings.completion.api_key = String::new();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingField(_))
        ));

        assert!(settings_with_keys().validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = settings_with_keys();

        settings.server.port = 0;
        assert!(settings.validate_server().is_err());
        settings.server.port = 8080;

        settings.server.timeout_seconds = 0;
        assert!(settings.validate_server().is_err());
        settings.server.timeout_seconds = 30;

        assert!(settings.validate_server().is_ok());
    }

    #[test]
    fn test_price_validation_bounds() {
        let mut settings = settings_with_keys();

        settings.price.cache_capacity = 0;
        assert!(settings.validate_price().is_err());
        settings.price.cache_capacity = 100;

        settings.price.cache_ttl_seconds = 0;
        assert!(settings.validate_price().is_err());
        settings.price.cache_ttl_seconds = 300;

        assert!(settings.validate_price().is_ok());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut settings = settings_with_keys();

        settings.completion.temperature = 2.5;
        assert!(settings.validate_completion().is_err());

        settings.completion.temperature = -0.1;
        assert!(settings.validate_completion().is_err());

        settings.completion.temperature = 0.7;
        assert!(settings.validate_completion().is_ok());
    }

    #[test]
    fn test_translation_requires_endpoint_when_enabled() {
        let mut settings = settings_with_keys();
        settings.translation.enabled = true;
        settings.translation.endpoint = String::new();
        assert!(settings.validate_translation().is_err());

        settings.translation.enabled = false;
        assert!(settings.validate_translation().is_ok());
    }
}
