//! HTTP endpoints
//!
//! REST API for the chat agent.

use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use chat_agent_core::Turn;

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );
    let timeout = Duration::from_secs(state.config.server.timeout_seconds);

    Router::new()
        // Chat endpoint (one message in, one reply out)
        .route("/api/chat", post(chat))
        // Full history for display
        .route("/api/conversation", get(conversation))
        // Health check
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    turn_count: usize,
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let reply = state.router.process(message).await;

    Ok(Json(ChatResponse {
        reply,
        turn_count: state.router.conversation().turn_count(),
    }))
}

/// Full conversation history, oldest first
async fn conversation(State(state): State<AppState>) -> Json<serde_json::Value> {
    let turns: Vec<Turn> = state.router.conversation().history();
    Json(serde_json::json!({
        "count": turns.len(),
        "turns": turns,
    }))
}

/// Health check
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserialization() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "Tell me a joke"}"#).unwrap();
        assert_eq!(request.message, "Tell me a joke");
    }

    #[test]
    fn test_chat_response_serialization() {
        let response = ChatResponse {
            reply: "The current price of BTC is 65000.00 USD.".to_string(),
            turn_count: 2,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"turn_count\":2"));
        assert!(json.contains("65000.00 USD"));
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Must not panic on unparseable origins; falls back to defaults
        let _ = build_cors_layer(&["\u{0}bad".to_string()], true);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["http://localhost:3000".to_string()], true);
    }
}
