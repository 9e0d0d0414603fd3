//! Customer inbox repository.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use bloom_bouquet_core::{
    NotificationId, NotificationKind, OrderId, Page, PageRequest, UserId,
};

use super::RepositoryError;
use crate::models::Notification;

/// Insert one notification; usable inside a checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    user: UserId,
    kind: NotificationKind,
    title: &str,
    message: &str,
    order: Option<OrderId>,
) -> Result<NotificationId, RepositoryError> {
    let id = sqlx::query_scalar(
        r"
        INSERT INTO notifications (user_id, order_id, title, message, kind)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(user)
    .bind(order)
    .bind(title)
    .bind(message)
    .bind(kind)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<Notification>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user)
            .fetch_one(self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Notification>(
            r"
            SELECT id, order_id, title, message, kind, read_at, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(rows, page, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one of the customer's notifications read. Already-read rows keep
    /// their original timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification is not theirs.
    pub async fn mark_read(
        &self,
        user: UserId,
        id: NotificationId,
        now: DateTime<Utc>,
    ) -> Result<Notification, RepositoryError> {
        sqlx::query_as::<_, Notification>(
            r"
            UPDATE notifications
            SET read_at = COALESCE(read_at, $3)
            WHERE id = $1 AND user_id = $2
            RETURNING id, order_id, title, message, kind, read_at, created_at
            ",
        )
        .bind(id)
        .bind(user)
        .bind(now)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Returns how many were newly marked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_read(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $2 WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user)
        .bind(now)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
