//! HTTP server for the quote checker.

pub mod routes;
pub mod state;

pub use state::AppState;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::pipeline::llm::CompletionClient;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the application router.
///
/// The body cap is enforced by [`RequestBodyLimitLayer`] for the whole
/// request, so an oversized upload is answered with 413 before the form is
/// parsed. Axum's own per-extractor default is disabled so that the
/// configured cap is the only one in play.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config().max_body_bytes;

    Router::new()
        .route("/", get(routes::index).post(routes::submit))
        .route("/health", get(routes::health))
        .with_state(state)
        // Middleware layers (applied bottom to top)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Quote-checker HTTP server
pub struct QuoteServer {
    config: ServerConfig,
    state: AppState,
}

impl QuoteServer {
    /// Prepare the staging directory and shared state.
    pub async fn new(
        config: ServerConfig,
        client: Arc<dyn CompletionClient>,
    ) -> Result<Self, ServerError> {
        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| {
                ServerError::Startup(format!(
                    "Cannot create upload directory {}: {}",
                    config.upload_dir.display(),
                    e
                ))
            })?;

        if !config.has_credential() {
            warn!("No completion credential configured; quote checks will be refused");
        }

        let state = AppState::new(config.clone(), client);
        Ok(Self { config, state })
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Startup(format!("Failed to bind {addr}: {e}")))?;

        info!("Starting quote checker on http://{}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Startup(format!("Server error: {e}")))?;

        Ok(())
    }

    /// The configured `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }
}
