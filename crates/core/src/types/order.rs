//! Order placement rules: numbering, payment deadlines and totals.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::status::{OrderStatus, PaymentMethod};

/// Minutes a QRIS code stays payable.
pub const QRIS_TTL_MINUTES: i64 = 15;

/// Hours a bank transfer may take before the order lapses.
pub const BANK_TRANSFER_TTL_HOURS: i64 = 24;

/// Length of the random suffix in an order number.
pub const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

/// Alphabet for order number suffixes (no 0/O or 1/I to keep them readable).
pub const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Returns every line of order `$1` to its product's stock, summing lines
/// that share a product. Lines whose product was deleted are skipped.
///
/// Both the admin and storefront cancel paths run this statement.
pub const RESTORE_STOCK_SQL: &str = r"
UPDATE products p
SET stock = p.stock + oi.quantity, updated_at = NOW()
FROM (
    SELECT product_id, SUM(quantity)::int AS quantity
    FROM order_items
    WHERE order_id = $1 AND product_id IS NOT NULL
    GROUP BY product_id
) oi
WHERE p.id = oi.product_id
";

/// Human-facing order reference, e.g. `BB-20261017-K3Q9TX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number for `placed_at` using `pick` to choose suffix
    /// characters. `pick(n)` must return an index below `n`.
    #[must_use]
    pub fn generate(placed_at: DateTime<Utc>, mut pick: impl FnMut(usize) -> usize) -> Self {
        let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
            .map(|_| {
                let idx = pick(ORDER_NUMBER_ALPHABET.len()) % ORDER_NUMBER_ALPHABET.len();
                ORDER_NUMBER_ALPHABET
                    .get(idx)
                    .copied()
                    .map_or('X', char::from)
            })
            .collect();
        Self(format!("BB-{}-{suffix}", placed_at.format("%Y%m%d")))
    }

    /// The order number text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Initial status and deadlines for a freshly placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSchedule {
    /// Status the order starts in.
    pub initial_status: OrderStatus,
    /// When an unpaid order lapses, if ever.
    pub payment_deadline: Option<DateTime<Utc>>,
    /// When the QRIS code stops being payable (QRIS only).
    pub qr_expires_at: Option<DateTime<Utc>>,
}

impl PaymentSchedule {
    /// Schedule for an order placed at `placed_at` with `method`.
    #[must_use]
    pub fn for_method(method: PaymentMethod, placed_at: DateTime<Utc>) -> Self {
        match method {
            PaymentMethod::Qris => {
                let expires = placed_at + Duration::minutes(QRIS_TTL_MINUTES);
                Self {
                    initial_status: OrderStatus::WaitingForPayment,
                    payment_deadline: Some(expires),
                    qr_expires_at: Some(expires),
                }
            }
            PaymentMethod::BankTransfer => Self {
                initial_status: OrderStatus::WaitingForPayment,
                payment_deadline: Some(placed_at + Duration::hours(BANK_TRANSFER_TTL_HOURS)),
                qr_expires_at: None,
            },
            PaymentMethod::CashOnDelivery => Self {
                initial_status: OrderStatus::Processing,
                payment_deadline: None,
                qr_expires_at: None,
            },
        }
    }
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product name at the time of purchase.
    pub product_name: String,
    /// Unit price at the time of purchase.
    pub price: Money,
    /// Units ordered.
    pub quantity: i32,
}

impl OrderLine {
    /// Price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Order money summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Sum the lines and add shipping.
    #[must_use]
    pub fn compute(lines: &[OrderLine], shipping_cost: Money) -> Self {
        let subtotal: Money = lines.iter().map(OrderLine::subtotal).sum();
        Self {
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_restore_stock_sql_skips_deleted_products() {
        assert!(RESTORE_STOCK_SQL.contains("order_id = $1"));
        assert!(RESTORE_STOCK_SQL.contains("product_id IS NOT NULL"));
        assert!(RESTORE_STOCK_SQL.contains("GROUP BY product_id"));
    }

    fn placed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn test_order_number_format() {
        let mut n = 0;
        let number = OrderNumber::generate(placed_at(), |len| {
            n += 1;
            n % len
        });
        assert_eq!(number.as_str(), "BB-20261017-BCDEFG");
    }

    #[test]
    fn test_order_number_index_is_clamped() {
        let number = OrderNumber::generate(placed_at(), |_| usize::MAX);
        assert_eq!(number.as_str().len(), "BB-20261017-".len() + ORDER_NUMBER_SUFFIX_LEN);
    }

    #[test]
    fn test_qris_schedule() {
        let schedule = PaymentSchedule::for_method(PaymentMethod::Qris, placed_at());
        assert_eq!(schedule.initial_status, OrderStatus::WaitingForPayment);
        assert_eq!(
            schedule.qr_expires_at,
            Some(placed_at() + Duration::minutes(15))
        );
        assert_eq!(schedule.payment_deadline, schedule.qr_expires_at);
    }

    #[test]
    fn test_bank_transfer_schedule() {
        let schedule = PaymentSchedule::for_method(PaymentMethod::BankTransfer, placed_at());
        assert_eq!(
            schedule.payment_deadline,
            Some(placed_at() + Duration::hours(24))
        );
        assert!(schedule.qr_expires_at.is_none());
    }

    #[test]
    fn test_cash_on_delivery_skips_payment_wait() {
        let schedule = PaymentSchedule::for_method(PaymentMethod::CashOnDelivery, placed_at());
        assert_eq!(schedule.initial_status, OrderStatus::Processing);
        assert!(schedule.payment_deadline.is_none());
    }

    #[test]
    fn test_totals() {
        let lines = vec![
            OrderLine {
                product_name: "Red Rose Bouquet".to_owned(),
                price: Money::from_rupiah(250_000),
                quantity: 2,
            },
            OrderLine {
                product_name: "Greeting Card".to_owned(),
                price: Money::from_rupiah(15_000),
                quantity: 1,
            },
        ];
        let totals = OrderTotals::compute(&lines, Money::from_rupiah(20_000));
        assert_eq!(totals.subtotal, Money::from_rupiah(515_000));
        assert_eq!(totals.total, Money::from_rupiah(535_000));
    }

    #[test]
    fn test_totals_empty() {
        let totals = OrderTotals::compute(&[], Money::ZERO);
        assert_eq!(totals.total, Money::ZERO);
    }
}
