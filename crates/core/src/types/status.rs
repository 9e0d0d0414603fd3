//! Status enums for orders, payments, staff and messaging.
//!
//! Each enum maps to a PostgreSQL enum type of the same snake-case name.
//! Order and payment statuses also carry their allowed transitions.

use serde::{Deserialize, Serialize};

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from {from} to {to}")]
pub struct TransitionError {
    /// Current status.
    pub from: &'static str,
    /// Requested status.
    pub to: &'static str,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    #[default]
    WaitingForPayment,
    /// Paid (or cash on delivery) and being arranged.
    Processing,
    /// Handed to the courier.
    Shipping,
    /// Received by the customer.
    Delivered,
    /// Cancelled by the customer, an admin, or a payment expiry sweep.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::WaitingForPayment,
        Self::Processing,
        Self::Shipping,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Database / wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForPayment => "waiting_for_payment",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable label used in customer notifications.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WaitingForPayment => "Waiting for payment",
            Self::Processing => "Being prepared",
            Self::Shipping => "On the way",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// No further changes are allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::WaitingForPayment, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipping | Self::Cancelled)
                | (Self::Shipping, Self::Delivered)
        )
    }

    /// Validate a transition.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `next` is not a legal successor.
    pub const fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }

    /// Moving into this status hands reserved stock back to the shelf.
    #[must_use]
    pub const fn releases_stock(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Expired,
    Refunded,
}

impl PaymentStatus {
    /// Every status.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Failed,
        Self::Expired,
        Self::Refunded,
    ];

    /// Database / wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Refunded => "refunded",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Failed | Self::Expired)
                | (Self::Paid, Self::Refunded)
        )
    }

    /// Validate a transition.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `next` is not a legal successor.
    pub const fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }

    /// Validate a payment change on an order currently in `order`.
    ///
    /// Once the order is delivered or cancelled the only payment change left
    /// is refunding a paid order.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] naming the order status when the order is
    /// closed, otherwise as [`PaymentStatus::transition`].
    pub const fn transition_for_order(
        self,
        order: OrderStatus,
        next: Self,
    ) -> Result<Self, TransitionError> {
        if order.is_terminal() && !matches!((self, next), (Self::Paid, Self::Refunded)) {
            return Err(TransitionError {
                from: order.as_str(),
                to: next.as_str(),
            });
        }
        self.transition(next)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid payment status: {s}"))
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// QRIS code scanned from a banking or e-wallet app.
    Qris,
    /// Manual bank transfer.
    BankTransfer,
    /// Paid to the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    /// Database / wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Qris => "qris",
            Self::BankTransfer => "bank_transfer",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Everything, including managing other admins.
    SuperAdmin,
    /// Store management.
    Admin,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

/// Category of a customer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "notification_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Payment,
    Promo,
    System,
}

/// Who wrote a support chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "chat_sender", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Admin,
}

/// Kind of stored report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "report_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Paid orders and revenue over a date range.
    Sales,
    /// Stock levels and units sold per product.
    Products,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_happy_path() {
        let status = OrderStatus::WaitingForPayment
            .transition(OrderStatus::Processing)
            .and_then(|s| s.transition(OrderStatus::Shipping))
            .and_then(|s| s.transition(OrderStatus::Delivered));
        assert_eq!(status, Ok(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_terminal_states_are_final() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Shipping.is_terminal());
    }

    #[test]
    fn test_order_cannot_skip_or_repeat() {
        assert!(!OrderStatus::WaitingForPayment.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Shipping.can_transition_to(OrderStatus::Cancelled));

        let err = OrderStatus::Shipping
            .transition(OrderStatus::WaitingForPayment)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot move from shipping to waiting_for_payment");
    }

    #[test]
    fn test_payment_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Expired));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Expired.can_transition_to(PaymentStatus::Paid));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
    }

    #[test]
    fn test_closed_orders_only_accept_refunds() {
        let err = PaymentStatus::Pending
            .transition_for_order(OrderStatus::Cancelled, PaymentStatus::Paid)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot move from cancelled to paid");
        assert!(
            PaymentStatus::Pending
                .transition_for_order(OrderStatus::Delivered, PaymentStatus::Failed)
                .is_err()
        );
        assert_eq!(
            PaymentStatus::Paid.transition_for_order(OrderStatus::Cancelled, PaymentStatus::Refunded),
            Ok(PaymentStatus::Refunded)
        );
        assert_eq!(
            PaymentStatus::Pending
                .transition_for_order(OrderStatus::WaitingForPayment, PaymentStatus::Paid),
            Ok(PaymentStatus::Paid)
        );
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_names_match_database_names() {
        let json = serde_json::to_string(&OrderStatus::WaitingForPayment).unwrap_or_default();
        assert_eq!(json, "\"waiting_for_payment\"");
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap_or_default();
        assert_eq!(json, "\"cash_on_delivery\"");
    }

    #[test]
    fn test_admin_role_parse() {
        assert_eq!("super_admin".parse::<AdminRole>(), Ok(AdminRole::SuperAdmin));
        assert_eq!(AdminRole::Admin.to_string(), "admin");
        assert!("viewer".parse::<AdminRole>().is_err());
    }
}
