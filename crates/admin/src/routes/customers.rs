//! Customer accounts (read and delete).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bloom_bouquet_core::{Page, PageRequest, UserId};

use crate::db::CustomerRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{Customer, OrderSummary};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(index))
        .route("/api/customers/{id}", get(show).delete(destroy))
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerSearch {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub orders: Vec<OrderSummary>,
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CustomerSearch>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Customer>>> {
    Ok(Json(
        CustomerRepository::new(state.pool())
            .list(query.search.as_deref(), page)
            .await?,
    ))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<CustomerDetail>> {
    let repo = CustomerRepository::new(state.pool());
    let customer = repo.get(id).await?;
    let orders = repo.orders(id).await?;
    Ok(Json(CustomerDetail { customer, orders }))
}

#[instrument(skip(state))]
pub async fn destroy(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    CustomerRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "Deleted customer");
    Ok(StatusCode::NO_CONTENT)
}
