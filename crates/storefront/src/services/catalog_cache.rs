//! Short-lived cache for the catalog lists every page asks for.
//!
//! The admin API writes categories and carousels directly to the database,
//! so entries expire after a minute instead of being invalidated.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{Carousel, Category};

const TTL: Duration = Duration::from_secs(60);

const CATEGORIES_KEY: &str = "categories";
const CAROUSELS_KEY: &str = "carousels";

#[derive(Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    Carousels(Vec<Carousel>),
}

/// Cached reads of active categories and carousel slides.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<&'static str, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().max_capacity(16).time_to_live(TTL).build(),
        }
    }

    /// Active categories with product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss that fails to load.
    pub async fn categories(&self, pool: &PgPool) -> Result<Vec<Category>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(CATEGORIES_KEY).await {
            return Ok(categories);
        }
        let categories = CatalogRepository::new(pool).categories().await?;
        self.cache
            .insert(CATEGORIES_KEY, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Active carousel slides in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss that fails to load.
    pub async fn carousels(&self, pool: &PgPool) -> Result<Vec<Carousel>, RepositoryError> {
        if let Some(CacheValue::Carousels(slides)) = self.cache.get(CAROUSELS_KEY).await {
            return Ok(slides);
        }
        let slides = CatalogRepository::new(pool).carousels().await?;
        self.cache
            .insert(CAROUSELS_KEY, CacheValue::Carousels(slides.clone()))
            .await;
        Ok(slides)
    }
}
