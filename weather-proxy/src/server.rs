//! Proxy server lifecycle: bind, serve, stop on Ctrl-C.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host name or address to bind to, e.g. `0.0.0.0` or `localhost`.
    pub host: String,
    pub port: u16,
}

/// Resolve `host` and bind the listener. Port 0 picks a free port.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: format!("{}:{}", config.host, config.port),
            source,
        })
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the host cannot be resolved or bound, or the server
/// hits a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    match listener.local_addr() {
        Ok(addr) => info!(%addr, "weather proxy listening"),
        Err(_) => info!(host = %config.host, port = config.port, "weather proxy listening"),
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("weather proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
