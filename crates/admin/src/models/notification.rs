//! Customer notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{NotificationId, NotificationKind, OrderId, UserId};

use crate::error::FieldErrors;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /api/notifications`. Without `user_id` the notification
/// goes to every customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationInput {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NotificationInput {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "The title field is required.");
        }
        if self.message.trim().is_empty() {
            errors.add("message", "The message field is required.");
        }
        errors
    }
}
