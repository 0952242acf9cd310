//! HTTP server for the chat agent
//!
//! A thin boundary in front of the router: one chat endpoint, the full
//! conversation history for display, and a health check.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
