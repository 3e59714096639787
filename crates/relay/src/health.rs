//! Liveness endpoint for hosting platforms that probe an HTTP port.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{http::header, response::IntoResponse, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const ALIVE_TEXT: &str = "Bot is alive!";

async fn alive() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], ALIVE_TEXT)
}

/// Every method and path answers 200.
pub fn app() -> Router {
    Router::new().fallback(alive)
}

pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind health server to {addr}"))
}

pub async fn serve(listener: TcpListener, shutdown: CancellationToken) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Health server listening on {addr}");
    }
    axum::serve(listener, app())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Health server error")
}
