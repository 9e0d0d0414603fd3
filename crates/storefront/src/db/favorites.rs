//! Favorite products.

use sqlx::PgPool;

use bloom_bouquet_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;

pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Favorited products that are still active, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user: UserId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.category_id, c.name AS category_name, c.slug AS category_slug,
                   p.name, p.slug, p.description, p.price, p.stock, p.image, p.is_featured,
                   p.created_at
            FROM favorites f
            JOIN products p ON p.id = f.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE f.user_id = $1 AND p.is_active
            ORDER BY f.created_at DESC, f.id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Favorite a product. Favoriting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no active product has this ID.
    pub async fn add(&self, user: UserId, product: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO favorites (user_id, product_id)
            SELECT $1, id FROM products WHERE id = $2 AND is_active
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user)
        .bind(product)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 && !self.contains(user, product).await? {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product was not a favorite.
    pub async fn remove(&self, user: UserId, product: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user)
            .bind(product)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn contains(&self, user: UserId, product: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND product_id = $2)",
        )
        .bind(user)
        .bind(product)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}
