//! Report generation and stored snapshots.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use bloom_bouquet_core::{Page, PageRequest, ReportId};

use crate::db::ReportRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::Report;
use crate::services::{ReportRequest, reports};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(index).post(create))
        .route("/api/reports/{id}", get(show).delete(destroy))
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Report>>> {
    Ok(Json(ReportRepository::new(state.pool()).list(page).await?))
}

#[instrument(skip(state, request))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<(StatusCode, Json<Report>)> {
    request.validate().into_result()?;
    let report = reports::generate(state.pool(), &request, Some(admin.id)).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ReportId>,
) -> Result<Json<Report>> {
    Ok(Json(ReportRepository::new(state.pool()).get(id).await?))
}

pub async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ReportId>,
) -> Result<StatusCode> {
    ReportRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
