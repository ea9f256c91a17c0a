use std::sync::Arc;

use sealnote_core::relay::SessionStore;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = Arc::new(SessionStore::new(config.max_sessions));
        Self { config, sessions }
    }

    /// State around an existing store, for tests and embedding.
    pub fn with_store(config: Config, sessions: Arc<SessionStore>) -> Self {
        Self { config, sessions }
    }
}
