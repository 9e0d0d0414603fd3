//! Notification repository.

use sqlx::{PgExecutor, PgPool};

use bloom_bouquet_core::{NotificationId, NotificationKind, OrderId, Page, PageRequest, UserId};

use super::RepositoryError;
use crate::models::Notification;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, order_id, title, message, kind, read_at, created_at";

/// Insert one notification through any executor, so callers can write it
/// inside the transaction that caused it.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    kind: NotificationKind,
    title: &str,
    message: &str,
    order_id: Option<OrderId>,
) -> Result<NotificationId, RepositoryError> {
    let id = sqlx::query_scalar(
        r"
        INSERT INTO notifications (user_id, order_id, title, message, kind)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(order_id)
    .bind(title)
    .bind(message)
    .bind(kind)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Notifications newest first, optionally for one customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<Notification>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE ($1::int IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Notification>(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE ($1::int IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(rows, page, total))
    }

    /// Send to one customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn create(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Notification, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        let id = insert(self.pool, user_id, kind, title, message, None).await?;
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(self.pool)
        .await
        .map_err(Into::into)
    }

    /// Send to every customer; returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn broadcast(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO notifications (user_id, title, message, kind)
            SELECT id, $1, $2, $3 FROM users
            ",
        )
        .bind(title)
        .bind(message)
        .bind(kind)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    pub async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
