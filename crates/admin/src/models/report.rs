//! Stored reports and their row types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{AdminId, Money, ProductId, ReportId, ReportType};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub report_type: ReportType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_orders: i64,
    pub total_revenue: Money,
    pub data: serde_json::Value,
    pub generated_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
}

/// Paid orders and revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: i64,
    pub revenue: Money,
}

/// Best sellers within a report period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// The `data` payload of a sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReportData {
    pub daily: Vec<DailySales>,
    pub top_products: Vec<TopProduct>,
    pub average_order_value: Money,
}

/// One row of a products report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductStock {
    pub id: ProductId,
    pub name: String,
    pub stock: i32,
    pub is_active: bool,
    /// Units sold on paid orders inside the period.
    pub units_sold: i64,
}
