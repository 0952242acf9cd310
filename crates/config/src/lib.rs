//! Configuration management for the chat agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files under config/
//! - Environment variables (CHAT_AGENT prefix)
//!
//! Two secrets are required before the server will accept input: the price
//! service API key and the completion service API key. Their absence fails
//! validation, which halts startup.

// Centralized constants module
pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, CompletionServiceConfig, ObservabilityConfig, PriceServiceConfig, ServerConfig,
    Settings, TranslationServiceConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
