//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;

use chat_agent_agent::Router;
use chat_agent_config::Settings;

/// Application state.
///
/// A single shared conversation is served (no multi-user isolation), so the
/// state holds exactly one router, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Settings>,
    /// The message router owning the session's conversation
    pub router: Arc<Router>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Settings, router: Router) -> Self {
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
        }
    }
}
