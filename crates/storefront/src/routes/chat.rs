//! Support chat with the shop.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use crate::db::ChatRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::ChatMessage;
use crate::models::chat::NewMessage;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat", get(thread).post(send))
}

/// The whole thread, oldest first. Reading it marks staff replies as read.
pub async fn thread(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatMessage>>> {
    Ok(Json(ChatRepository::new(state.pool()).thread(user.id).await?))
}

#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn send(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<NewMessage>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    body.validate().into_result()?;
    let message = ChatRepository::new(state.pool())
        .send(user.id, body.message.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
