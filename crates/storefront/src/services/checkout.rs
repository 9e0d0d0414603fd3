//! Checkout: turn the customer's cart into an order.
//!
//! Everything happens in one transaction. Cart lines and their products are
//! locked in product order, stock is taken with a guarded `UPDATE`, and the
//! cart is emptied only when the order commits.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use bloom_bouquet_core::{
    Money, NotificationKind, OrderLine, OrderNumber, OrderTotals, PaymentSchedule, ProductId,
    UserId,
};

use crate::db::orders::{self, LockedLine, NewOrder, OrderRepository};
use crate::db::{RepositoryError, notifications};
use crate::models::{CheckoutRequest, OrderDetail};

/// Attempts at drawing an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Reasons checkout refuses to place an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("{product_name} is no longer available")]
    Unavailable {
        product_id: ProductId,
        product_name: String,
    },

    #[error("Only {available} of {product_name} left in stock")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i32,
    },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Check locked lines against stock and freeze them into order lines.
///
/// # Errors
///
/// Returns the first line that is inactive or short on stock.
pub fn freeze_lines(lines: &[LockedLine]) -> Result<Vec<OrderLine>, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    lines
        .iter()
        .map(|line| {
            if !line.is_active {
                return Err(CheckoutError::Unavailable {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                });
            }
            if line.quantity > line.stock {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    available: line.stock.max(0),
                });
            }
            Ok(OrderLine {
                product_name: line.product_name.clone(),
                price: line.price,
                quantity: line.quantity,
            })
        })
        .collect()
}

fn draw_order_number(now: DateTime<Utc>) -> OrderNumber {
    let mut rng = rand::rng();
    OrderNumber::generate(now, |n| rng.random_range(0..n))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Place an order from the customer's cart.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart`, `CheckoutError::Unavailable` or
/// `CheckoutError::InsufficientStock` when the cart can't be fulfilled, and
/// `CheckoutError::Repository` if the database fails.
#[tracing::instrument(skip(pool, request), fields(user_id = %user))]
pub async fn place_order(
    pool: &PgPool,
    user: UserId,
    request: &CheckoutRequest,
    shipping: Money,
    now: DateTime<Utc>,
) -> Result<OrderDetail, CheckoutError> {
    let mut tx = pool.begin().await?;

    let locked = orders::lock_cart(&mut tx, user).await?;
    let lines = freeze_lines(&locked)?;

    let totals = OrderTotals::compute(&lines, shipping);
    let schedule = PaymentSchedule::for_method(request.payment_method, now);

    let mut placed = None;
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let order_number = draw_order_number(now);
        let new_order = NewOrder {
            order_number: &order_number,
            user_id: user,
            shipping_name: request.shipping_name.trim(),
            shipping_phone: request.shipping_phone.trim(),
            shipping_address: request.shipping_address.trim(),
            notes: non_blank(request.notes.as_deref()),
            totals,
            payment_method: request.payment_method,
            schedule,
        };
        if let Some(id) = orders::insert_order(&mut tx, &new_order).await? {
            placed = Some((id, order_number));
            break;
        }
        tracing::debug!(order_number = %order_number.as_str(), "Order number taken, drawing again");
    }
    let (order_id, order_number) = placed.ok_or_else(|| {
        RepositoryError::Conflict("could not allocate an order number".to_string())
    })?;

    for (locked_line, line) in locked.iter().zip(&lines) {
        orders::insert_item(&mut tx, order_id, locked_line.product_id, line).await?;
        if !orders::take_stock(&mut tx, locked_line.product_id, line.quantity).await? {
            return Err(CheckoutError::InsufficientStock {
                product_id: locked_line.product_id,
                product_name: locked_line.product_name.clone(),
                available: locked_line.stock.max(0),
            });
        }
    }

    orders::clear_cart(&mut tx, user).await?;
    notifications::insert(
        &mut *tx,
        user,
        NotificationKind::Order,
        "Order placed",
        &format!(
            "Your order {} for {} has been placed.",
            order_number.as_str(),
            totals.total.display()
        ),
        Some(order_id),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        order_number = %order_number.as_str(),
        total = %totals.total,
        lines = lines.len(),
        "Order placed"
    );

    Ok(OrderRepository::new(pool)
        .get_by_number(user, order_number.as_str())
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, stock: i32, quantity: i32, is_active: bool) -> LockedLine {
        LockedLine {
            product_id: ProductId::new(id),
            product_name: format!("Bouquet {id}"),
            price: Money::from_rupiah(150_000),
            stock,
            is_active,
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert!(matches!(freeze_lines(&[]), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_inactive_product_is_rejected() {
        let lines = [line(1, 10, 1, true), line(2, 10, 1, false)];
        assert!(matches!(
            freeze_lines(&lines),
            Err(CheckoutError::Unavailable { product_id, .. }) if product_id == ProductId::new(2)
        ));
    }

    #[test]
    fn test_short_stock_reports_what_is_left() {
        let lines = [line(3, 2, 5, true)];
        match freeze_lines(&lines) {
            Err(CheckoutError::InsufficientStock { available, .. }) => assert_eq!(available, 2),
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_lines_keep_name_and_price() {
        let frozen = freeze_lines(&[line(4, 5, 2, true)]).expect("lines");
        assert_eq!(frozen.len(), 1);
        assert_eq!(frozen[0].product_name, "Bouquet 4");
        assert_eq!(frozen[0].subtotal(), Money::from_rupiah(300_000));
    }

    #[test]
    fn test_order_number_format() {
        let now = DateTime::parse_from_rfc3339("2026-10-17T09:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let number = draw_order_number(now);
        assert!(number.as_str().starts_with("BB-20261017-"));
        assert_eq!(number.as_str().len(), "BB-20261017-".len() + 6);
    }
}
