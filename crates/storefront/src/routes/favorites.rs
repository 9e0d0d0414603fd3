//! Favorite products.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use bloom_bouquet_core::ProductId;

use crate::db::FavoriteRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/favorites", get(index))
        .route("/api/favorites/{product_id}", post(add).delete(remove))
}

pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(FavoriteRepository::new(state.pool()).list(user.id).await?))
}

/// Idempotent: favoriting twice is not an error.
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    FavoriteRepository::new(state.pool())
        .add(user.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    FavoriteRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
