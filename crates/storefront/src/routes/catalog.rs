//! Public catalog: categories, products and home page slides.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;

use bloom_bouquet_core::{Page, PageRequest};

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::models::{Carousel, Category, Product, ProductFilter};
use crate::state::AppState;

/// Related products shown next to a product.
const RELATED_LIMIT: i64 = 4;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(categories))
        .route("/api/categories/{slug}/products", get(category_products))
        .route("/api/products", get(products))
        .route("/api/products/{slug}", get(product))
        .route("/api/carousels", get(carousels))
}

#[derive(Debug, Serialize)]
pub struct CategoryProducts {
    pub category: Category,
    pub products: Page<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub related: Vec<Product>,
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories(state.pool()).await?))
}

pub async fn category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(mut filter): Query<ProductFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<CategoryProducts>> {
    let repo = CatalogRepository::new(state.pool());
    let category = repo.category_by_slug(&slug).await?;
    filter.category = Some(slug);
    let products = repo.products(&filter, page).await?;
    Ok(Json(CategoryProducts { category, products }))
}

pub async fn products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Product>>> {
    Ok(Json(
        CatalogRepository::new(state.pool())
            .products(&filter, page)
            .await?,
    ))
}

pub async fn product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let repo = CatalogRepository::new(state.pool());
    let product = repo.product_by_slug(&slug).await?;
    let related = repo.related(&product, RELATED_LIMIT).await?;
    Ok(Json(ProductDetail { product, related }))
}

pub async fn carousels(State(state): State<AppState>) -> Result<Json<Vec<Carousel>>> {
    Ok(Json(state.catalog().carousels(state.pool()).await?))
}
