//! Dashboard overview.

use axum::{Json, Router, extract::State, routing::get};

use crate::db::DashboardRepository;
use crate::db::dashboard::DashboardStats;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(index))
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(DashboardRepository::new(state.pool()).stats().await?))
}
