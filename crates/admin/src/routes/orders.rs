//! Order management.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use serde::Deserialize;
use tracing::instrument;

use bloom_bouquet_core::{OrderId, OrderStatus, Page, PageRequest, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{Order, OrderDetail, OrderFilter, OrderSummary};
use crate::services::notifications;
use crate::services::order_expiry::{self, SweepReport};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(index))
        .route("/api/orders/sweep", post(sweep))
        .route("/api/orders/{id}", get(show))
        .route("/api/orders/{id}/status", patch(update_status))
        .route("/api/orders/{id}/payment-status", patch(update_payment_status))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<OrderSummary>>> {
    Ok(Json(
        OrderRepository::new(state.pool()).list(&filter, page).await?,
    ))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(
        OrderRepository::new(state.pool()).get_detail(id).await?,
    ))
}

/// Move an order along its lifecycle and notify the customer.
#[instrument(skip(state, body), fields(status = %body.status))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await?;

    tracing::info!(admin_id = %admin.id, order_number = %order.order_number, "Order status changed");
    notifications::dispatch_order_status(state.pool(), &order).await;
    Ok(Json(order))
}

/// Change the payment status and notify the customer.
#[instrument(skip(state, body), fields(payment_status = %body.payment_status))]
pub async fn update_payment_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<PaymentStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_payment_status(id, body.payment_status)
        .await?;

    tracing::info!(admin_id = %admin.id, order_number = %order.order_number, "Payment status changed");
    notifications::dispatch_payment_status(state.pool(), &order).await;
    Ok(Json(order))
}

/// Run both expiry sweeps immediately.
#[instrument(skip(state))]
pub async fn sweep(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SweepReport>>> {
    Ok(Json(order_expiry::run_all(state.pool()).await?))
}
