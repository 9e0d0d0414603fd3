//! Customer repository (read and delete only).

use sqlx::PgPool;

use bloom_bouquet_core::{Page, PageRequest, UserId};

use super::{RepositoryError, like_pattern};
use crate::models::{Customer, OrderSummary};

const CUSTOMER_SELECT: &str = r"
    SELECT u.id, u.name, u.email, u.phone, u.address, u.email_verified_at,
           COUNT(o.id) AS order_count,
           COALESCE(SUM(o.total_amount) FILTER (WHERE o.payment_status = 'paid'), 0) AS total_spent,
           u.created_at
    FROM users u
    LEFT JOIN orders o ON o.user_id = u.id
";

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of customers, newest first, optionally filtered by name,
    /// email or phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM users u
            WHERE ($1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1 OR u.phone ILIKE $1)
            ",
        )
        .bind(search.as_deref())
        .fetch_one(self.pool)
        .await?;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r"
            {CUSTOMER_SELECT}
            WHERE ($1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1 OR u.phone ILIKE $1)
            GROUP BY u.id
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(search.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(customers, page, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn get(&self, id: UserId) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!("{CUSTOMER_SELECT} WHERE u.id = $1 GROUP BY u.id"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// The customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn orders(&self, id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r"
            SELECT o.id, o.order_number, o.user_id, u.name AS customer_name,
                   u.email AS customer_email, o.total_amount, o.payment_method,
                   o.payment_status, o.status, o.created_at
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Delete a customer together with their cart, favorites, orders,
    /// notifications and chat history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
