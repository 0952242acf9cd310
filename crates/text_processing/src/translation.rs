//! Language detection and translation to English
//!
//! Non-English input is normalized to English before it reaches the
//! completion backend. Translation is best-effort by contract:
//! `translate_to_english` never propagates a failure, it falls back to the
//! original text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Translation errors. These stay inside the adapter boundary; the router
/// only ever sees fallback text.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::Network(err.to_string())
    }
}

/// Language detection and translation interface
#[async_trait]
pub trait Translator: Send + Sync {
    /// Detect the dominant language of the text, as an ISO 639-1 code
    async fn detect_language(&self, text: &str) -> Result<String, TranslationError>;

    /// Translate text to English.
    ///
    /// Must not fail: on any upstream error the original text is returned
    /// unchanged, so downstream always receives a best-effort English string.
    async fn translate_to_english(&self, text: &str) -> String;

    /// Service name for logging
    fn service_name(&self) -> &str;
}

/// Configuration for the HTTP translator
#[derive(Debug, Clone)]
pub struct HttpTranslatorConfig {
    /// Service endpoint (LibreTranslate-compatible)
    pub endpoint: String,
    /// API key, if the deployment requires one
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpTranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Adapter for a LibreTranslate-compatible translation service
pub struct HttpTranslator {
    config: HttpTranslatorConfig,
    client: Client,
}

impl HttpTranslator {
    /// Create a new translator
    pub fn new(config: HttpTranslatorConfig) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                TranslationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    async fn request_translation(&self, text: &str) -> Result<String, TranslationError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: "en",
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.url("translate"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        Ok(body.translated_text)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn detect_language(&self, text: &str) -> Result<String, TranslationError> {
        let request = DetectRequest {
            q: text,
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.url("detect"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Api(format!("HTTP {}: {}", status, body)));
        }

        let candidates: Vec<DetectResponse> = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        candidates
            .into_iter()
            .next()
            .map(|c| c.language)
            .ok_or_else(|| TranslationError::InvalidResponse("empty detection result".to_string()))
    }

    async fn translate_to_english(&self, text: &str) -> String {
        match self.request_translation(text).await {
            Ok(translated) => translated,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    service = self.service_name(),
                    "translation failed, using original text"
                );
                text.to_string()
            }
        }
    }

    fn service_name(&self) -> &str {
        "libretranslate"
    }
}

/// No-op translator used when translation is disabled.
///
/// Everything is reported as English and returned verbatim.
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn detect_language(&self, _text: &str) -> Result<String, TranslationError> {
        Ok("en".to_string())
    }

    async fn translate_to_english(&self, text: &str) -> String {
        text.to_string()
    }

    fn service_name(&self) -> &str {
        "noop"
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    language: String,
    #[allow(dead_code)]
    confidence: f32,
}
