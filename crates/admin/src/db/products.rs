//! Product repository.

use sqlx::PgPool;

use bloom_bouquet_core::{Page, PageRequest, ProductId};

use super::slugs::{self, SlugTable};
use super::{RepositoryError, like_pattern};
use crate::models::{Product, ProductFilter, ProductInput};

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.category_id, c.name AS category_name, p.name, p.slug,
           p.description, p.price, p.stock, p.image, p.is_active, p.is_featured,
           p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
";

const PRODUCT_FILTER: &str = r"
    WHERE ($1::text IS NULL OR p.name ILIKE $1 OR p.slug ILIKE $1)
      AND ($2::int IS NULL OR p.category_id = $2)
      AND ($3::bool IS NULL OR p.is_active = $3)
      AND ($4::int IS NULL OR p.stock <= $4)
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
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

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products p {PRODUCT_FILTER}"
        ))
        .bind(search.as_deref())
        .bind(filter.category_id)
        .bind(filter.is_active)
        .bind(filter.low_stock)
        .fetch_one(self.pool)
        .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT} {PRODUCT_FILTER} ORDER BY p.created_at DESC, p.id DESC LIMIT $5 OFFSET $6"
        ))
        .bind(search.as_deref())
        .bind(filter.category_id)
        .bind(filter.is_active)
        .bind(filter.low_stock)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(products, page, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Create a product, allocating a unique slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a concurrent insert took the slug.
    /// Returns `RepositoryError::Database` if the category does not exist.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let base = slugs::base_slug(SlugTable::Products, &input.name, input.slug.as_deref());
        let slug = slugs::allocate(&mut *tx, SlugTable::Products, &base, None).await?;

        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products
                (category_id, name, slug, description, price, stock, is_active, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let slug = slugs::for_update(
            &mut *tx,
            SlugTable::Products,
            id.as_i32(),
            &input.name,
            input.slug.as_deref(),
        )
        .await?;

        let result = sqlx::query(
            r"
            UPDATE products
            SET category_id = $2, name = $3, slug = $4, description = $5,
                price = $6, stock = $7, is_active = $8, is_featured = $9,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.is_featured)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Set stock to an absolute level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_stock(&self, id: ProductId, stock: i32) -> Result<Product, RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(stock)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await
    }

    /// Add `delta` (possibly negative) to stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if stock would drop below zero.
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn adjust_stock(
        &self,
        id: ProductId,
        delta: i32,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products SET stock = stock + $2, updated_at = NOW()
            WHERE id = $1 AND stock + $2 >= 0
            ",
        )
        .bind(id)
        .bind(delta)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either missing or the adjustment would go negative.
            let product = self.get(id).await?;
            return Err(RepositoryError::Conflict(format!(
                "only {} in stock",
                product.stock
            )));
        }
        self.get(id).await
    }

    /// Point the product at a stored image, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_image(
        &self,
        id: ProductId,
        image: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let previous: Option<Option<String>> = sqlx::query_scalar(
            r"
            UPDATE products p
            SET image = $2, updated_at = NOW()
            FROM (SELECT image FROM products WHERE id = $1 FOR UPDATE) old
            WHERE p.id = $1
            RETURNING old.image
            ",
        )
        .bind(id)
        .bind(image)
        .fetch_optional(self.pool)
        .await?;

        previous.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product, returning its image path.
    ///
    /// Past order lines keep their name and price snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<Option<String>, RepositoryError> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        image.ok_or(RepositoryError::NotFound)
    }
}
