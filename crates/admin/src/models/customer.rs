//! Customer accounts as seen by staff.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bloom_bouquet_core::{Email, Money, UserId};

/// A storefront customer with order totals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub order_count: i64,
    /// Sum of paid orders.
    pub total_spent: Money,
    pub created_at: DateTime<Utc>,
}
