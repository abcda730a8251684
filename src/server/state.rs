//! Shared application state for the quote server.

use crate::config::ServerConfig;
use crate::pipeline::llm::CompletionClient;
use std::sync::Arc;

/// Read-only state handed to every handler.
///
/// Cloning is cheap: everything sits behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    /// Completion backend (OpenAI in production, a double in tests)
    client: Arc<dyn CompletionClient>,
}

impl AppState {
    pub fn new(config: ServerConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, client }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &dyn CompletionClient {
        self.inner.client.as_ref()
    }
}
