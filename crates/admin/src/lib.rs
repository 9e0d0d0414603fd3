//! Bloom Bouquet admin library.
//!
//! The admin JSON API, its database repositories and migrations, the order
//! expiry sweeper, report generation and image uploads. The maintenance CLI
//! links against this crate to reuse the same repositories and services.
//!
//! # Security
//!
//! This crate holds staff-level access to the whole shop schema:
//! - Catalog, order and customer management
//! - Admin account management (super admins only)

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
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Health checks, the API routes and `/uploads`, without the outer
/// session, tracing and Sentry layers.
pub fn app_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::router())
        .nest_service("/uploads", ServeDir::new(&state.config().upload_dir))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
