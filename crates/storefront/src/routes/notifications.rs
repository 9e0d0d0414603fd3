//! Customer inbox.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;

use bloom_bouquet_core::{NotificationId, Page, PageRequest};

use crate::db::NotificationRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Notification;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(index))
        .route("/api/notifications/unread-count", get(unread_count))
        .route("/api/notifications/read-all", post(read_all))
        .route("/api/notifications/{id}/read", post(read))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Notification>>> {
    Ok(Json(
        NotificationRepository::new(state.pool())
            .list(user.id, page)
            .await?,
    ))
}

pub async fn unread_count(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UnreadCount>> {
    let count = NotificationRepository::new(state.pool())
        .unread_count(user.id)
        .await?;
    Ok(Json(UnreadCount { count }))
}

pub async fn read(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>> {
    Ok(Json(
        NotificationRepository::new(state.pool())
            .mark_read(user.id, id, Utc::now())
            .await?,
    ))
}

pub async fn read_all(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<MarkedRead>> {
    let updated = NotificationRepository::new(state.pool())
        .mark_all_read(user.id, Utc::now())
        .await?;
    Ok(Json(MarkedRead { updated }))
}
