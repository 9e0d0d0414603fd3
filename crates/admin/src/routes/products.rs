//! Product management.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;
use tracing::instrument;

use bloom_bouquet_core::{Page, PageRequest, ProductId};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, FieldErrors, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::{Product, ProductFilter, ProductInput};
use crate::services::uploads::{self, MAX_UPLOAD_BYTES, UploadFolder};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(index).post(create))
        .route("/api/products/{id}", get(show).put(update).delete(destroy))
        .route(
            "/api/products/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2)),
        )
        .route("/api/products/{id}/stock", patch(update_stock))
}

/// Body of `PATCH /api/products/{id}/stock`: exactly one of the fields.
#[derive(Debug, Deserialize)]
pub struct StockRequest {
    /// Absolute stock level.
    pub stock: Option<i32>,
    /// Signed change to the current level.
    pub adjustment: Option<i32>,
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Product>>> {
    Ok(Json(
        ProductRepository::new(state.pool())
            .list(&filter, page)
            .await?,
    ))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(ProductRepository::new(state.pool()).get(id).await?))
}

async fn validate_input(state: &AppState, input: &ProductInput) -> Result<()> {
    let mut errors = input.validate();
    if let Some(category_id) = input.category_id {
        match CategoryRepository::new(state.pool()).get(category_id).await {
            Ok(_) => {}
            Err(RepositoryError::NotFound) => {
                errors.add("category_id", "The selected category is invalid.");
            }
            Err(e) => return Err(e.into()),
        }
    }
    errors.into_result()
}

#[instrument(skip(state, input), fields(name = %input.name))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_input(&state, &input).await?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, slug = ?product.slug, "Created product");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, input))]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate_input(&state, &input).await?;
    Ok(Json(
        ProductRepository::new(state.pool()).update(id, &input).await?,
    ))
}

#[instrument(skip(state))]
pub async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let image = ProductRepository::new(state.pool()).delete(id).await?;
    if let Some(image) = image {
        uploads::remove(&state.config().upload_dir, &image).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn update_stock(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<StockRequest>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let product = match (body.stock, body.adjustment) {
        (Some(stock), None) => {
            let mut errors = FieldErrors::new();
            if stock < 0 {
                errors.add("stock", "The stock must be at least 0.");
            }
            errors.into_result()?;
            repo.set_stock(id, stock).await?
        }
        (None, Some(delta)) => repo.adjust_stock(id, delta).await?,
        _ => {
            return Err(AppError::BadRequest(
                "Provide exactly one of `stock` or `adjustment`".to_string(),
            ));
        }
    };

    tracing::info!(admin_id = %admin.id, product_id = %id, stock = product.stock, "Updated stock");
    Ok(Json(product))
}

#[instrument(skip(state, multipart))]
pub async fn upload_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    repo.get(id).await?;

    let (filename, bytes) = uploads::read_image_field(&mut multipart).await?;
    let root = &state.config().upload_dir;
    let stored = uploads::store(root, UploadFolder::Products, &filename, &bytes).await?;

    match repo.set_image(id, &stored).await {
        Ok(previous) => {
            if let Some(previous) = previous {
                uploads::remove(root, &previous).await;
            }
        }
        Err(e) => {
            uploads::remove(root, &stored).await;
            return Err(e.into());
        }
    }

    Ok(Json(repo.get(id).await?))
}
