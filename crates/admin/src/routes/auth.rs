//! Staff login, logout and identity.

use axum::{Json, Router, extract::State, http::StatusCode, routing::{get, post}};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::session_error;
use crate::db::AdminRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::{Admin, CurrentAdmin};
use crate::services::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Log in with email and password.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Admin>> {
    let admin = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await
        .inspect_err(|_| tracing::info!("Failed admin login"))?;

    set_current_admin(&session, &CurrentAdmin::from(&admin))
        .await
        .map_err(session_error)?;
    set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));

    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok(Json(admin))
}

/// End the session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await.map_err(session_error)?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in admin, re-read from the database.
pub async fn me(
    RequireAdminAuth(current): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Admin>> {
    AdminRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
}
