//! Orders from the customer's side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{
    Money, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
};

use super::user::{MAX_FIELD_LENGTH, is_phone_char};
use crate::error::FieldErrors;

/// One row of `GET /api/orders`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
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
}

impl Order {
    /// Customers may only cancel while the order waits for payment.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.status == OrderStatus::WaitingForPayment
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub price: Money,
    pub quantity: i32,
    pub subtotal: Money,
}

/// An order with its lines and a formatted total.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_display: String,
    pub can_cancel: bool,
}

impl OrderDetail {
    #[must_use]
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            total_display: order.total_amount.display(),
            can_cancel: order.can_cancel(),
            order,
            items,
        }
    }
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_name: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require(
            "shipping_name",
            &self.shipping_name,
            "The shipping name field is required.",
        );
        errors.require(
            "shipping_phone",
            &self.shipping_phone,
            "The shipping phone field is required.",
        );
        errors.require(
            "shipping_address",
            &self.shipping_address,
            "The shipping address field is required.",
        );
        if self.shipping_name.chars().count() > MAX_FIELD_LENGTH {
            errors.add(
                "shipping_name",
                "The shipping name may not be greater than 255 characters.",
            );
        }
        if !self.shipping_phone.chars().all(is_phone_char) {
            errors.add("shipping_phone", "The shipping phone format is invalid.");
        }
        if self.notes.as_deref().is_some_and(|n| n.chars().count() > 1000) {
            errors.add("notes", "The notes may not be greater than 1000 characters.");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            shipping_name: "Dewi Lestari".to_string(),
            shipping_phone: "0812 3456 7890".to_string(),
            shipping_address: "Jl. Melati No. 5, Bandung".to_string(),
            notes: Some("Please add a card".to_string()),
            payment_method: PaymentMethod::Qris,
        }
    }

    #[test]
    fn test_valid_checkout_request() {
        assert!(request().validate().is_empty());
    }

    #[test]
    fn test_checkout_requires_address_fields() {
        let mut req = request();
        req.shipping_address = " ".to_string();
        req.shipping_phone = "not-a-phone".to_string();
        let errors = req.validate();
        assert!(errors.get("shipping_address").is_some());
        assert!(errors.get("shipping_phone").is_some());
    }

    #[test]
    fn test_payment_method_wire_names() {
        let req: CheckoutRequest = serde_json::from_str(
            r#"{"shipping_name":"A","shipping_phone":"1","shipping_address":"B","payment_method":"cash_on_delivery"}"#,
        )
        .expect("request");
        assert_eq!(req.payment_method, PaymentMethod::CashOnDelivery);
    }
}
