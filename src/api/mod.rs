// HTTP surface over LedgerService.

mod error;
mod handlers;

pub use error::*;
pub use handlers::*;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::LedgerService;

/// Build the application router.
pub fn router(service: LedgerService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/accounts/", get(list_accounts).post(create_account))
        .route("/accounts/:account_id", get(get_account))
        .route(
            "/accounts/:account_id/transactions",
            get(get_account_transactions),
        )
        .route("/transactions/", post(create_transaction))
        .route("/transfer/", post(transfer_money))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(service: LedgerService, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("LKH Bank API listening on http://{}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
