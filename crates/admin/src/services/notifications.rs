//! Customer notification dispatch.

use sqlx::PgPool;

use bloom_bouquet_core::{
    NotificationId, NotificationKind, OrderId, OrderStatus, PaymentStatus, UserId,
};

use crate::db::notifications::{self, NotificationRepository};
use crate::db::RepositoryError;
use crate::models::Order;

/// Write one notification for `user`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn notify_user(
    pool: &PgPool,
    user: UserId,
    kind: NotificationKind,
    title: &str,
    message: &str,
    order: Option<OrderId>,
) -> Result<NotificationId, RepositoryError> {
    notifications::insert(pool, user, kind, title, message, order).await
}

/// Write the same notification for every customer. Returns how many were sent.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn broadcast(
    pool: &PgPool,
    kind: NotificationKind,
    title: &str,
    message: &str,
) -> Result<u64, RepositoryError> {
    let sent = NotificationRepository::new(pool)
        .broadcast(kind, title, message)
        .await?;
    tracing::info!(recipients = sent, "Broadcast notification");
    Ok(sent)
}

/// Title and body for an order status change.
#[must_use]
pub fn order_status_message(order_number: &str, status: OrderStatus) -> (String, String) {
    let message = match status {
        OrderStatus::WaitingForPayment => {
            format!("Order {order_number} is waiting for your payment.")
        }
        OrderStatus::Processing => format!("Order {order_number} is being prepared by our florists."),
        OrderStatus::Shipping => format!("Order {order_number} is on its way to you."),
        OrderStatus::Delivered => format!("Order {order_number} has been delivered. Enjoy your flowers!"),
        OrderStatus::Cancelled => format!("Order {order_number} has been cancelled."),
    };
    (format!("Order {}", status.label().to_lowercase()), message)
}

/// Title and body for a payment status change.
#[must_use]
pub fn payment_status_message(order_number: &str, status: PaymentStatus) -> (String, String) {
    match status {
        PaymentStatus::Pending => (
            "Payment pending".to_string(),
            format!("We are still waiting for payment of order {order_number}."),
        ),
        PaymentStatus::Paid => (
            "Payment received".to_string(),
            format!("Payment for order {order_number} has been confirmed. Thank you!"),
        ),
        PaymentStatus::Failed => (
            "Payment failed".to_string(),
            format!("Payment for order {order_number} failed."),
        ),
        PaymentStatus::Expired => (
            "Payment expired".to_string(),
            format!("The payment window for order {order_number} has closed."),
        ),
        PaymentStatus::Refunded => (
            "Payment refunded".to_string(),
            format!("Payment for order {order_number} has been refunded."),
        ),
    }
}

/// Tell the customer their order moved. The change is already committed, so
/// a failed insert is logged rather than surfaced.
pub async fn dispatch_order_status(pool: &PgPool, order: &Order) {
    let (title, message) = order_status_message(&order.order_number, order.status);
    if let Err(e) = notify_user(
        pool,
        order.user_id,
        NotificationKind::Order,
        &title,
        &message,
        Some(order.id),
    )
    .await
    {
        tracing::warn!(order_id = %order.id, error = %e, "Failed to send order notification");
    }
}

/// Tell the customer their payment status changed.
pub async fn dispatch_payment_status(pool: &PgPool, order: &Order) {
    let (title, message) = payment_status_message(&order.order_number, order.payment_status);
    if let Err(e) = notify_user(
        pool,
        order.user_id,
        NotificationKind::Payment,
        &title,
        &message,
        Some(order.id),
    )
    .await
    {
        tracing::warn!(order_id = %order.id, error = %e, "Failed to send payment notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_message_mentions_number() {
        let (title, message) = order_status_message("BB-20260214-ABC234", OrderStatus::Shipping);
        assert_eq!(title, "Order on the way");
        assert!(message.contains("BB-20260214-ABC234"));
    }

    #[test]
    fn test_payment_status_message() {
        let (title, message) = payment_status_message("BB-20260214-ABC234", PaymentStatus::Paid);
        assert_eq!(title, "Payment received");
        assert!(message.contains("confirmed"));
    }
}
