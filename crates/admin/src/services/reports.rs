//! Report generation.
//!
//! Reports are computed from live order data, stored as a JSONB snapshot and
//! returned to the caller as JSON.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use bloom_bouquet_core::{AdminId, Money, ReportType};

use crate::db::RepositoryError;
use crate::db::reports::{NewReport, ReportRepository};
use crate::error::FieldErrors;
use crate::models::{DailySales, Report, SalesReportData};

/// Body of `POST /api/reports`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
}

impl ReportRequest {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.end_date < self.start_date {
            errors.add(
                "end_date",
                "The end date must be a date after or equal to start date.",
            );
        }
        errors
    }

    fn title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(
                || {
                    let kind = match self.report_type {
                        ReportType::Sales => "Sales",
                        ReportType::Products => "Products",
                    };
                    format!("{kind} report {} to {}", self.start_date, self.end_date)
                },
                str::to_string,
            )
    }
}

/// Order count and revenue summed over the daily rows.
#[must_use]
pub fn summarize(daily: &[DailySales]) -> (i64, Money, Money) {
    let orders: i64 = daily.iter().map(|d| d.orders).sum();
    let revenue: Money = daily.iter().map(|d| d.revenue).sum();
    let average = if orders > 0 {
        Money::new((revenue.amount() / Decimal::from(orders)).round_dp(2))
    } else {
        Money::ZERO
    };
    (orders, revenue, average)
}

/// Generate and store a report for the request's period.
///
/// The caller must have validated the request.
///
/// # Errors
///
/// Returns `RepositoryError` if a query or the insert fails.
#[instrument(skip(pool, request), fields(report_type = ?request.report_type))]
pub async fn generate(
    pool: &PgPool,
    request: &ReportRequest,
    generated_by: Option<AdminId>,
) -> Result<Report, RepositoryError> {
    match request.report_type {
        ReportType::Sales => generate_sales_report(pool, request, generated_by).await,
        ReportType::Products => generate_products_report(pool, request, generated_by).await,
    }
}

async fn generate_sales_report(
    pool: &PgPool,
    request: &ReportRequest,
    generated_by: Option<AdminId>,
) -> Result<Report, RepositoryError> {
    let repo = ReportRepository::new(pool);
    let daily = repo
        .daily_sales(request.start_date, request.end_date)
        .await?;
    let top_products = repo
        .top_products(request.start_date, request.end_date)
        .await?;

    let (total_orders, total_revenue, average_order_value) = summarize(&daily);
    let data = SalesReportData {
        daily,
        top_products,
        average_order_value,
    };

    let report = repo
        .store(&NewReport {
            title: request.title(),
            report_type: ReportType::Sales,
            period_start: request.start_date,
            period_end: request.end_date,
            total_orders,
            total_revenue,
            data: to_json(&data)?,
            generated_by,
        })
        .await?;

    tracing::info!(report_id = %report.id, total_orders, "Generated sales report");
    Ok(report)
}

async fn generate_products_report(
    pool: &PgPool,
    request: &ReportRequest,
    generated_by: Option<AdminId>,
) -> Result<Report, RepositoryError> {
    let repo = ReportRepository::new(pool);
    let products = repo
        .product_stock(request.start_date, request.end_date)
        .await?;
    let daily = repo
        .daily_sales(request.start_date, request.end_date)
        .await?;
    let (total_orders, total_revenue, _) = summarize(&daily);

    let report = repo
        .store(&NewReport {
            title: request.title(),
            report_type: ReportType::Products,
            period_start: request.start_date,
            period_end: request.end_date,
            total_orders,
            total_revenue,
            data: serde_json::json!({ "products": to_json(&products)? }),
            generated_by,
        })
        .await?;

    tracing::info!(report_id = %report.id, products = products.len(), "Generated products report");
    Ok(report)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("report serialization: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, orders: i64, revenue: i64) -> DailySales {
        DailySales {
            date: NaiveDate::from_ymd_opt(2026, 2, d).expect("date"),
            orders,
            revenue: Money::from_rupiah(revenue),
        }
    }

    fn request(start: u32, end: u32) -> ReportRequest {
        ReportRequest {
            report_type: ReportType::Sales,
            start_date: NaiveDate::from_ymd_opt(2026, 2, start).expect("date"),
            end_date: NaiveDate::from_ymd_opt(2026, 2, end).expect("date"),
            title: None,
        }
    }

    #[test]
    fn test_summarize() {
        let (orders, revenue, average) =
            summarize(&[day(13, 2, 300_000), day(14, 1, 150_000)]);
        assert_eq!(orders, 3);
        assert_eq!(revenue, Money::from_rupiah(450_000));
        assert_eq!(average, Money::from_rupiah(150_000));
    }

    #[test]
    fn test_summarize_empty() {
        let (orders, revenue, average) = summarize(&[]);
        assert_eq!(orders, 0);
        assert_eq!(revenue, Money::ZERO);
        assert_eq!(average, Money::ZERO);
    }

    #[test]
    fn test_end_before_start_is_invalid() {
        assert!(request(14, 13).validate().get("end_date").is_some());
        assert!(request(14, 14).validate().is_empty());
    }

    #[test]
    fn test_default_title() {
        assert_eq!(request(1, 14).title(), "Sales report 2026-02-01 to 2026-02-14");
    }
}
