//! Support chat, staff side.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use bloom_bouquet_core::UserId;

use crate::db::ChatRepository;
use crate::error::{FieldErrors, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{ChatMessage, Conversation};
use crate::state::AppState;

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/chat", get(index))
        .route("/api/chat/{user_id}", get(show).post(reply))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Conversation>>> {
    Ok(Json(ChatRepository::new(state.pool()).conversations().await?))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<ChatMessage>>> {
    Ok(Json(ChatRepository::new(state.pool()).thread(user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn reply(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let message = body.message.trim();
    let mut errors = FieldErrors::new();
    if message.is_empty() {
        errors.add("message", "The message field is required.");
    } else if message.chars().count() > MAX_MESSAGE_LENGTH {
        errors.add("message", "The message may not be greater than 2000 characters.");
    }
    errors.into_result()?;

    let sent = ChatRepository::new(state.pool())
        .reply(user_id, admin.id, message)
        .await?;
    Ok((StatusCode::CREATED, Json(sent)))
}
