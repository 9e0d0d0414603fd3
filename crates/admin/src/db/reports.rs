//! Report aggregation queries and stored report snapshots.

use chrono::NaiveDate;
use sqlx::PgPool;

use bloom_bouquet_core::{AdminId, Money, Page, PageRequest, ReportId, ReportType};

use super::RepositoryError;
use crate::models::{DailySales, ProductStock, Report, TopProduct};

const REPORT_COLUMNS: &str = "id, title, report_type, period_start, period_end, total_orders, \
                              total_revenue, data, generated_by, created_at";

/// How many products a sales report ranks.
pub const TOP_PRODUCTS_LIMIT: i64 = 10;

/// A report row before it is stored.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub report_type: ReportType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_orders: i64,
    pub total_revenue: Money,
    pub data: serde_json::Value,
    pub generated_by: Option<AdminId>,
}

/// Repository for report queries.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paid orders per day in `[start, end]`, days without sales omitted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_sales(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailySales>(
            r"
            SELECT created_at::date AS date,
                   COUNT(*) AS orders,
                   COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE payment_status = 'paid'
              AND created_at::date BETWEEN $1 AND $2
            GROUP BY created_at::date
            ORDER BY date
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Best sellers by quantity among paid orders in `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT oi.product_name,
                   SUM(oi.quantity)::bigint AS quantity,
                   COALESCE(SUM(oi.subtotal), 0) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.payment_status = 'paid'
              AND o.created_at::date BETWEEN $1 AND $2
            GROUP BY oi.product_name
            ORDER BY quantity DESC, revenue DESC, oi.product_name
            LIMIT $3
            ",
        )
        .bind(start)
        .bind(end)
        .bind(TOP_PRODUCTS_LIMIT)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Current stock per product with units sold in `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_stock(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProductStock>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductStock>(
            r"
            SELECT p.id, p.name, p.stock, p.is_active,
                   COALESCE(SUM(oi.quantity) FILTER (
                       WHERE o.payment_status = 'paid'
                         AND o.created_at::date BETWEEN $1 AND $2
                   ), 0)::bigint AS units_sold
            FROM products p
            LEFT JOIN order_items oi ON oi.product_id = p.id
            LEFT JOIN orders o ON o.id = oi.order_id
            GROUP BY p.id
            ORDER BY p.stock, p.name
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn store(&self, report: &NewReport) -> Result<Report, RepositoryError> {
        let stored = sqlx::query_as::<_, Report>(&format!(
            r"
            INSERT INTO reports
                (title, report_type, period_start, period_end, total_orders,
                 total_revenue, data, generated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REPORT_COLUMNS}
            "
        ))
        .bind(&report.title)
        .bind(report.report_type)
        .bind(report.period_start)
        .bind(report.period_end)
        .bind(report.total_orders)
        .bind(report.total_revenue)
        .bind(&report.data)
        .bind(report.generated_by)
        .fetch_one(self.pool)
        .await?;
        Ok(stored)
    }

    /// Stored reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, page: PageRequest) -> Result<Page<Report>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(self.pool)
            .await?;

        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(reports, page, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the report does not exist.
    pub async fn get(&self, id: ReportId) -> Result<Report, RepositoryError> {
        sqlx::query_as::<_, Report>(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the report does not exist.
    pub async fn delete(&self, id: ReportId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
