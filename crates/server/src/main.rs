//! Chat Agent Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use chat_agent_agent::Router;
use chat_agent_config::{constants, load_settings, Settings};
use chat_agent_llm::{CompletionClient, TogetherBackend, TogetherConfig};
use chat_agent_price::{CoinApiConfig, CoinApiFeed, CryptoPriceClient};
use chat_agent_server::{create_router, AppState};
use chat_agent_text_processing::{
    HttpTranslator, HttpTranslatorConfig, NoopTranslator, Translator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from files and environment.
    // Missing API keys fail validation here, before anything is served.
    let env = std::env::var("CHAT_AGENT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Fatal configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!("Starting Chat Agent Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_env = env.as_deref().unwrap_or("default"),
        translation_enabled = config.translation.enabled,
        "Configuration loaded"
    );

    let router = build_agent(&config)?;
    let state = AppState::new(config.clone(), router);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Construct the router and its collaborators from settings.
///
/// Everything is built once here and injected; there is no ambient global
/// state to reach for later.
fn build_agent(config: &Settings) -> anyhow::Result<Router> {
    let feed = CoinApiFeed::new(CoinApiConfig {
        endpoint: config.price.endpoint.clone(),
        api_key: config.price.api_key.clone(),
        timeout: Duration::from_millis(config.price.timeout_ms),
    })?;

    let prices = Arc::new(CryptoPriceClient::new(
        Arc::new(feed),
        Duration::from_secs(config.price.cache_ttl_seconds),
        config.price.cache_capacity,
        Duration::from_secs(config.price.rate_limit_seconds),
    ));

    let backend = TogetherBackend::new(TogetherConfig {
        endpoint: config.completion.endpoint.clone(),
        api_key: config.completion.api_key.clone(),
        model: config.completion.model.clone(),
        max_tokens: config.completion.max_tokens,
        temperature: config.completion.temperature,
        timeout: Duration::from_millis(config.completion.timeout_ms),
    })?;

    let translator: Arc<dyn Translator> = if config.translation.enabled {
        Arc::new(HttpTranslator::new(HttpTranslatorConfig {
            endpoint: config.translation.endpoint.clone(),
            api_key: config.translation.api_key.clone(),
            timeout: Duration::from_millis(config.translation.timeout_ms),
        })?)
    } else {
        tracing::info!("Translation disabled, input passes through unchanged");
        Arc::new(NoopTranslator)
    };

    Ok(Router::new(
        translator,
        prices,
        CompletionClient::new(Arc::new(backend)),
        constants::conversation::CONTEXT_WINDOW_TURNS,
    ))
}

/// Initialize tracing from the observability settings
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("{},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
