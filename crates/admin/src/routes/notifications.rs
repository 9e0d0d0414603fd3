//! Customer notifications: list, send, broadcast, delete.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bloom_bouquet_core::{NotificationId, Page, PageRequest, UserId};

use crate::db::NotificationRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{Notification, NotificationInput};
use crate::services::notifications;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(index).post(create))
        .route("/api/notifications/{id}", delete(destroy))
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Option<UserId>,
}

/// What `POST /api/notifications` did.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SendResult {
    Single(Notification),
    Broadcast { recipients: u64 },
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Notification>>> {
    Ok(Json(
        NotificationRepository::new(state.pool())
            .list(query.user_id, page)
            .await?,
    ))
}

/// Send to one customer, or to everyone when `user_id` is omitted.
#[instrument(skip(state, input), fields(user_id = ?input.user_id, kind = ?input.kind))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<NotificationInput>,
) -> Result<(StatusCode, Json<SendResult>)> {
    input.validate().into_result()?;
    let title = input.title.trim();
    let message = input.message.trim();

    let result = match input.user_id {
        Some(user_id) => SendResult::Single(
            NotificationRepository::new(state.pool())
                .create(user_id, input.kind, title, message)
                .await?,
        ),
        None => SendResult::Broadcast {
            recipients: notifications::broadcast(state.pool(), input.kind, title, message).await?,
        },
    };

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode> {
    NotificationRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
