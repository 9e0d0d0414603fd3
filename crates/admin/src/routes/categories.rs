//! Category management.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bloom_bouquet_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{Category, CategoryInput};
use crate::services::uploads::{self, MAX_UPLOAD_BYTES, UploadFolder};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(index).post(create))
        .route(
            "/api/categories/{id}",
            get(show).put(update).delete(destroy),
        )
        .route(
            "/api/categories/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2)),
        )
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list_all().await?))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    Ok(Json(CategoryRepository::new(state.pool()).get(id).await?))
}

#[instrument(skip(state, input), fields(name = %input.name))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    input.validate().into_result()?;
    let category = CategoryRepository::new(state.pool()).create(&input).await?;
    tracing::info!(category_id = %category.id, slug = ?category.slug, "Created category");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, input))]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    input.validate().into_result()?;
    Ok(Json(
        CategoryRepository::new(state.pool()).update(id, &input).await?,
    ))
}

/// Delete a category; its products become uncategorised.
#[instrument(skip(state))]
pub async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let image = CategoryRepository::new(state.pool()).delete(id).await?;
    if let Some(image) = image {
        uploads::remove(&state.config().upload_dir, &image).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, multipart))]
pub async fn upload_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    mut multipart: Multipart,
) -> Result<Json<Category>> {
    let repo = CategoryRepository::new(state.pool());
    repo.get(id).await?;

    let (filename, bytes) = uploads::read_image_field(&mut multipart).await?;
    let root = &state.config().upload_dir;
    let stored = uploads::store(root, UploadFolder::Categories, &filename, &bytes).await?;

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
