//! Home page carousel management.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use bloom_bouquet_core::CarouselId;

use crate::db::CarouselRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::{Carousel, CarouselInput};
use crate::services::uploads::{self, MAX_UPLOAD_BYTES, UploadFolder};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/carousels", get(index).post(create))
        .route("/api/carousels/{id}", get(show).put(update).delete(destroy))
        .route(
            "/api/carousels/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2)),
        )
}

pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Carousel>>> {
    Ok(Json(CarouselRepository::new(state.pool()).list_all().await?))
}

pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CarouselId>,
) -> Result<Json<Carousel>> {
    Ok(Json(CarouselRepository::new(state.pool()).get(id).await?))
}

#[instrument(skip(state, input), fields(title = %input.title))]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CarouselInput>,
) -> Result<(StatusCode, Json<Carousel>)> {
    input.validate().into_result()?;
    let slide = CarouselRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(slide)))
}

#[instrument(skip(state, input))]
pub async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CarouselId>,
    Json(input): Json<CarouselInput>,
) -> Result<Json<Carousel>> {
    input.validate().into_result()?;
    Ok(Json(
        CarouselRepository::new(state.pool()).update(id, &input).await?,
    ))
}

#[instrument(skip(state))]
pub async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CarouselId>,
) -> Result<StatusCode> {
    if let Some(image) = CarouselRepository::new(state.pool()).delete(id).await? {
        uploads::remove(&state.config().upload_dir, &image).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, multipart))]
pub async fn upload_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CarouselId>,
    mut multipart: Multipart,
) -> Result<Json<Carousel>> {
    let repo = CarouselRepository::new(state.pool());
    repo.get(id).await?;

    let (filename, bytes) = uploads::read_image_field(&mut multipart).await?;
    let root = &state.config().upload_dir;
    let stored = uploads::store(root, UploadFolder::Carousels, &filename, &bytes).await?;

    match repo.set_image(id, &stored).await {
        Ok(Some(previous)) => uploads::remove(root, &previous).await,
        Ok(None) => {}
        Err(e) => {
            uploads::remove(root, &stored).await;
            return Err(e.into());
        }
    }

    Ok(Json(repo.get(id).await?))
}
