//! JSON HTTP API.
//!
//! - `GET  /api/products`
//! - `POST /api/customers`
//! - `POST /api/orders/quote`
//! - `POST /api/orders`
//! - `GET  /api/orders/{id}`

pub mod error;
pub mod handlers;

use crate::core::config::ServerConfig;
use crate::service::QuoteService;
use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(service: Arc<QuoteService>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::list_products))
        .route("/api/customers", post(handlers::create_customer))
        .route("/api/orders/quote", post(handlers::quote))
        .route("/api/orders", post(handlers::create_order))
        .route("/api/orders/{id}", get(handlers::get_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serves the API until Ctrl+C.
pub async fn serve(config: &ServerConfig, service: Arc<QuoteService>) -> Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
