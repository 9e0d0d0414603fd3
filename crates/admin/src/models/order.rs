//! Order models as seen by staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{
    Email, Money, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
    UserId,
};

/// One row of the order list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: Email,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Full order header.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: Email,
    pub shipping_name: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub notes: Option<String>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub qr_expires_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased line, with name and price frozen at checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub price: Money,
    pub quantity: i32,
    pub subtotal: Money,
}

/// Order header, lines and display strings for the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_display: String,
}

impl OrderDetail {
    #[must_use]
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        let total_display = order.total_amount.display();
        Self {
            order,
            items,
            total_display,
        }
    }
}

/// Query string for the order list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    /// Matches order number, customer name or email.
    pub search: Option<String>,
}
