//! HTTP API over the dialogue engine and session store.

pub mod error;
pub mod routes;
pub mod schema;

use tokio::net::TcpListener;
use tracing::info;

use crate::dialogue::DialogueEngine;
use crate::error::{Error, Result};

pub use routes::{app_router, AppState};

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, engine: DialogueEngine) -> Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| Error::Bind {
        addr: addr.to_string(),
        source: e,
    })?;
    let local = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| addr.to_string());
    info!(addr = %local, "HTTP API listening");

    let app = app_router(AppState::new(engine));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
