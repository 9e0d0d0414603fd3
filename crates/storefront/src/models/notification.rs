//! Customer inbox.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bloom_bouquet_core::{NotificationId, NotificationKind, OrderId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub order_id: Option<OrderId>,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
