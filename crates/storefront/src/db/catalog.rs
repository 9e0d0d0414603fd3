//! Read-only catalog queries. Inactive products are never returned.

use sqlx::PgPool;

use bloom_bouquet_core::{Page, PageRequest};

use super::{RepositoryError, like_pattern};
use crate::models::{Carousel, Category, Product, ProductFilter};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.category_id, c.name AS category_name, c.slug AS category_slug,
           p.name, p.slug, p.description, p.price, p.stock, p.image, p.is_featured,
           p.created_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
";

const PRODUCT_FILTER: &str = r"
    WHERE p.is_active
      AND ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
      AND ($2::text IS NULL OR c.slug = $2)
      AND ($3::bool IS NULL OR p.is_featured = $3)
";

pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories by name, each with its active product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT c.id, c.name, c.slug, c.description, c.image,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name, c.id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// One page of active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id {PRODUCT_FILTER}"
        ))
        .bind(search.as_deref())
        .bind(category)
        .bind(filter.featured)
        .fetch_one(self.pool)
        .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT} {PRODUCT_FILTER} ORDER BY {} LIMIT $4 OFFSET $5",
            filter.sort.order_by()
        ))
        .bind(search.as_deref())
        .bind(category)
        .bind(filter.featured)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(products, page, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this slug.
    pub async fn category_by_slug(&self, slug: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            SELECT c.id, c.name, c.slug, c.description, c.image,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.slug = $1
            GROUP BY c.id
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no active product has this slug.
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT} WHERE p.is_active AND p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Up to `limit` other active products from the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(&self, product: &Product, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let Some(category_id) = product.category_id else {
            return Ok(Vec::new());
        };
        let products = sqlx::query_as::<_, Product>(&format!(
            r"{PRODUCT_SELECT}
            WHERE p.is_active AND p.category_id = $1 AND p.id <> $2
            ORDER BY p.is_featured DESC, p.created_at DESC
            LIMIT $3"
        ))
        .bind(category_id)
        .bind(product.id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Active banners in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn carousels(&self) -> Result<Vec<Carousel>, RepositoryError> {
        let carousels = sqlx::query_as::<_, Carousel>(
            r"
            SELECT id, title, description, image, link, sort_order
            FROM carousels
            WHERE is_active
            ORDER BY sort_order, id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(carousels)
    }
}
