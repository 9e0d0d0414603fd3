//! Category repository.

use sqlx::PgPool;

use bloom_bouquet_core::{CategoryId, Slug};

use super::RepositoryError;
use super::slugs::{self, SlugTable};
use crate::models::{Category, CategoryInput};

const CATEGORY_SELECT: &str = r"
    SELECT c.id, c.name, c.slug, c.description, c.image,
           (SELECT COUNT(*) FROM products p WHERE p.category_id = c.id) AS product_count,
           c.created_at, c.updated_at
    FROM categories c
";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>(&format!("{CATEGORY_SELECT} ORDER BY c.name"))
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn get(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(&format!("{CATEGORY_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Create a category, allocating a unique slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a concurrent insert took the slug.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let base = slugs::base_slug(SlugTable::Categories, &input.name, input.slug.as_deref());
        let slug = slugs::allocate(&mut *tx, SlugTable::Categories, &base, None).await?;

        let id: CategoryId = sqlx::query_scalar(
            r"
            INSERT INTO categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(input.description.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Update a category. The slug is re-derived when the name or explicit
    /// slug changes it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let slug: Slug = slugs::for_update(
            &mut *tx,
            SlugTable::Categories,
            id.as_i32(),
            &input.name,
            input.slug.as_deref(),
        )
        .await?;

        let result = sqlx::query(
            r"
            UPDATE categories
            SET name = $2, slug = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(input.description.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Point the category at a stored image, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn set_image(
        &self,
        id: CategoryId,
        image: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let previous: Option<Option<String>> = sqlx::query_scalar(
            r"
            UPDATE categories c
            SET image = $2, updated_at = NOW()
            FROM (SELECT image FROM categories WHERE id = $1 FOR UPDATE) old
            WHERE c.id = $1
            RETURNING old.image
            ",
        )
        .bind(id)
        .bind(image)
        .fetch_optional(self.pool)
        .await?;

        previous.ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Its products become uncategorised.
    ///
    /// Returns the image path so the caller can remove the file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<Option<String>, RepositoryError> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM categories WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        image.ok_or(RepositoryError::NotFound)
    }
}
