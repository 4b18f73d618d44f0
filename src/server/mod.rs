//! HTTP adapter exposing the role cache.
//!
//! - `GET /health` - liveness check
//! - `GET /roles/:user_id/admin` - single admin lookup
//! - `POST /roles/admin` - batched admin lookup
//! - `DELETE /roles/cache` - drop every cached decision

mod handlers;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::permissions::RoleCache;

pub use handlers::{AdminStatus, BatchRequest, BatchResponse};

/// Shared state for HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Admin role cache shared by every request.
    pub roles: RoleCache,
}

/// Build the router with all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/roles/admin", post(handlers::admin_statuses))
        .route("/roles/cache", delete(handlers::clear_cache))
        .route("/roles/:user_id/admin", get(handlers::admin_status))
        .with_state(state)
}

/// Serve the router on `addr` until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
