//! HTTP server for the Prometheus metrics endpoint.
//!
//! Serves `/metrics` for scraping and `/healthz` with the number of groups
//! that have records. Runs on its own tokio task.

use axum::{Router, extract::State, routing::get};
use std::net::SocketAddr;

use crate::SharedStore;

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Handler for GET /healthz.
async fn health_handler(State(store): State<SharedStore>) -> String {
    let groups = store.lock().groups_with_records().len();
    format!("ok groups={groups}\n")
}

/// Build the router; split out so it can be exercised without a socket.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(health_handler))
        .with_state(store)
}

/// Run the HTTP server until it fails.
///
/// Binds to `0.0.0.0:port`. Bind or serve failures are logged, never fatal.
pub async fn run_http_server(port: u16, store: SharedStore) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Metrics HTTP server listening");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind metrics HTTP server");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, router(store)).await {
        tracing::error!(error = %e, "Metrics HTTP server error");
    }
}
