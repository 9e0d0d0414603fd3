//! Aggregates for the admin dashboard.

use serde::Serialize;
use sqlx::PgPool;

use bloom_bouquet_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::OrderSummary;

/// Products at or below this stock level are flagged on the dashboard.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

const RECENT_ORDERS: i64 = 5;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardTotals {
    pub total_orders: i64,
    pub waiting_for_payment: i64,
    pub processing: i64,
    pub total_revenue: Money,
    pub revenue_today: Money,
    pub total_customers: i64,
    pub total_products: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub totals: DashboardTotals,
    pub recent_orders: Vec<OrderSummary>,
    pub low_stock: Vec<LowStockProduct>,
}

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let totals = sqlx::query_as::<_, DashboardTotals>(
            r"
            SELECT
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE status = 'waiting_for_payment') AS waiting_for_payment,
                (SELECT COUNT(*) FROM orders WHERE status = 'processing') AS processing,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders
                    WHERE payment_status = 'paid') AS total_revenue,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders
                    WHERE payment_status = 'paid' AND paid_at::date = CURRENT_DATE) AS revenue_today,
                (SELECT COUNT(*) FROM users) AS total_customers,
                (SELECT COUNT(*) FROM products) AS total_products
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, OrderSummary>(
            r"
            SELECT o.id, o.order_number, o.user_id, u.name AS customer_name,
                   u.email AS customer_email, o.total_amount, o.payment_method,
                   o.payment_status, o.status, o.created_at
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $1
            ",
        )
        .bind(RECENT_ORDERS)
        .fetch_all(self.pool)
        .await?;

        let low_stock = sqlx::query_as::<_, LowStockProduct>(
            r"
            SELECT id, name, stock FROM products
            WHERE is_active AND stock <= $1
            ORDER BY stock, name
            ",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(self.pool)
        .await?;

        Ok(DashboardStats {
            totals,
            recent_orders,
            low_stock,
        })
    }
}
