//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::ShipkitError;
use crate::server::handlers::{
    config_handler, health_handler, rpc_config_handler, version_handler,
};
use crate::server::state::ServerState;

/// Relay server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Build the relay routes
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Runtime config
        .route("/api/config", get(config_handler))
        .route("/trpc/config", get(rpc_config_handler))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), ShipkitError>>, ShipkitError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting config relay on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ShipkitError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ShipkitError::ServerError(e.to_string()))
    });

    Ok(handle)
}
