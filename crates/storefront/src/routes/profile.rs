//! Customer profile.

use axum::{Json, Router, extract::State, routing::put};
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{ProfileInput, User};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", put(update))
}

/// Update name, phone and address. Email and password are not editable here.
#[instrument(skip(state, input), fields(user_id = %user.id))]
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<User>> {
    input.validate().into_result()?;
    let updated = UserRepository::new(state.pool())
        .update_profile(user.id, &input)
        .await?;
    Ok(Json(updated))
}
