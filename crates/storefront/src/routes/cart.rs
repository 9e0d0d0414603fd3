//! Shopping cart.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use tracing::instrument;

use bloom_bouquet_core::ProductId;

use crate::db::CartRepository;
use crate::error::{FieldErrors, Result};
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::models::cart::{AddToCart, MAX_LINE_QUANTITY, SetQuantity};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(show).post(add).delete(clear))
        .route("/api/cart/{product_id}", put(update).delete(remove))
}

fn check_quantity(quantity: i32) -> Result<()> {
    let mut errors = FieldErrors::new();
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        errors.add(
            "quantity",
            format!("The quantity must be between 1 and {MAX_LINE_QUANTITY}."),
        );
    }
    errors.into_result()
}

async fn load(state: &AppState, user: bloom_bouquet_core::UserId) -> Result<Json<Cart>> {
    let items = CartRepository::new(state.pool()).items(user).await?;
    Ok(Json(Cart::new(items)))
}

pub async fn show(RequireAuth(user): RequireAuth, State(state): State<AppState>) -> Result<Json<Cart>> {
    load(&state, user.id).await
}

/// Add to the cart, merging with an existing line for the same product.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddToCart>,
) -> Result<Json<Cart>> {
    check_quantity(body.quantity)?;
    CartRepository::new(state.pool())
        .add(user.id, body.product_id, body.quantity)
        .await?;
    load(&state, user.id).await
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<SetQuantity>,
) -> Result<Json<Cart>> {
    check_quantity(body.quantity)?;
    CartRepository::new(state.pool())
        .set_quantity(user.id, product_id, body.quantity)
        .await?;
    load(&state, user.id).await
}

pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Cart>> {
    CartRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    load(&state, user.id).await
}

pub async fn clear(RequireAuth(user): RequireAuth, State(state): State<AppState>) -> Result<Json<Cart>> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(Cart::new(Vec::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(-3).is_err());
        assert!(check_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }
}
