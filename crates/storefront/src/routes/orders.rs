//! Checkout and order history.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use tracing::instrument;

use bloom_bouquet_core::{Page, PageRequest};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{CheckoutRequest, OrderDetail, OrderSummary};
use crate::services::checkout;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(place))
        .route("/api/orders", get(index))
        .route("/api/orders/{order_number}", get(show))
        .route("/api/orders/{order_number}/cancel", post(cancel))
}

/// Turn the cart into an order.
#[instrument(skip(state, body), fields(user_id = %user.id, method = ?body.payment_method))]
pub async fn place(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    body.validate().into_result()?;
    let order = checkout::place_order(
        state.pool(),
        user.id,
        &body,
        state.config().shipping_flat_rate,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<OrderSummary>>> {
    Ok(Json(
        OrderRepository::new(state.pool()).list(user.id, page).await?,
    ))
}

pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .get_by_number(user.id, &order_number)
            .await?,
    ))
}

/// Cancel an order that is still waiting for payment.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn cancel(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderDetail>> {
    let order = OrderRepository::new(state.pool())
        .cancel(user.id, &order_number, Utc::now())
        .await?;
    tracing::info!(order_number = %order_number, "Order cancelled by customer");
    Ok(Json(order))
}
