//! Bloom Bouquet storefront library.
//!
//! The customer-facing JSON API: accounts with emailed verification codes,
//! the public catalog, cart, favorites, checkout, order history, the inbox
//! and support chat. Kept as a library so the router can be exercised in
//! tests without a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;

use crate::state::AppState;

/// Health checks and the API routes, without the outer session, tracing
/// and Sentry layers.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::router())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
}

/// Liveness: the process is up.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 until the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
