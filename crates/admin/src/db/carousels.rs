//! Carousel slide repository.

use sqlx::PgPool;

use bloom_bouquet_core::CarouselId;

use super::RepositoryError;
use crate::models::{Carousel, CarouselInput};

const CAROUSEL_COLUMNS: &str =
    "id, title, description, image, link, sort_order, is_active, created_at, updated_at";

/// Repository for carousel database operations.
pub struct CarouselRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CarouselRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All slides in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Carousel>, RepositoryError> {
        let slides = sqlx::query_as::<_, Carousel>(&format!(
            "SELECT {CAROUSEL_COLUMNS} FROM carousels ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(slides)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn get(&self, id: CarouselId) -> Result<Carousel, RepositoryError> {
        sqlx::query_as::<_, Carousel>(&format!(
            "SELECT {CAROUSEL_COLUMNS} FROM carousels WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CarouselInput) -> Result<Carousel, RepositoryError> {
        let slide = sqlx::query_as::<_, Carousel>(&format!(
            r"
            INSERT INTO carousels (title, description, link, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CAROUSEL_COLUMNS}
            "
        ))
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(input.link.as_deref().filter(|l| !l.is_empty()))
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(slide)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn update(
        &self,
        id: CarouselId,
        input: &CarouselInput,
    ) -> Result<Carousel, RepositoryError> {
        sqlx::query_as::<_, Carousel>(&format!(
            r"
            UPDATE carousels
            SET title = $2, description = $3, link = $4, sort_order = $5,
                is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {CAROUSEL_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(input.link.as_deref().filter(|l| !l.is_empty()))
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Point the slide at a stored image, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn set_image(
        &self,
        id: CarouselId,
        image: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let previous: Option<Option<String>> = sqlx::query_scalar(
            r"
            UPDATE carousels c
            SET image = $2, updated_at = NOW()
            FROM (SELECT image FROM carousels WHERE id = $1 FOR UPDATE) old
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

    /// Delete a slide, returning its image path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide does not exist.
    pub async fn delete(&self, id: CarouselId) -> Result<Option<String>, RepositoryError> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM carousels WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        image.ok_or(RepositoryError::NotFound)
    }
}
