//! Order repository: listing, staff status changes and expiry sweeps.
//!
//! Every state change locks the order row (`FOR UPDATE`) inside a
//! transaction, so a staff edit, a customer cancellation and a sweep can
//! never both restore the same stock.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use bloom_bouquet_core::types::order::RESTORE_STOCK_SQL;
use bloom_bouquet_core::{
    NotificationKind, OrderId, OrderStatus, Page, PageRequest, PaymentMethod, PaymentStatus,
    TransitionError, UserId,
};

use super::notifications;
use super::{RepositoryError, like_pattern};
use crate::models::{Order, OrderDetail, OrderFilter, OrderItem, OrderSummary};

const ORDER_SELECT: &str = r"
    SELECT o.id, o.order_number, o.user_id, u.name AS customer_name, u.email AS customer_email,
           o.shipping_name, o.shipping_phone, o.shipping_address, o.notes,
           o.subtotal, o.shipping_cost, o.total_amount,
           o.payment_method, o.payment_status, o.status,
           o.payment_deadline, o.qr_expires_at, o.paid_at, o.cancelled_at,
           o.created_at, o.updated_at
    FROM orders o
    JOIN users u ON u.id = o.user_id
";

const ORDER_FILTER: &str = r"
    WHERE ($1::order_status IS NULL OR o.status = $1)
      AND ($2::payment_status IS NULL OR o.payment_status = $2)
      AND ($3::payment_method IS NULL OR o.payment_method = $3)
      AND ($4::text IS NULL OR o.order_number ILIKE $4 OR u.name ILIKE $4 OR u.email ILIKE $4)
";

/// Which overdue orders a sweep targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryKind {
    /// Unpaid orders past `payment_deadline`.
    PaymentDeadline,
    /// Pending QRIS orders past `qr_expires_at`.
    QrCode,
}

impl ExpiryKind {
    /// SQL predicate on `orders`; `$1` is the sweep's "now".
    const fn predicate(self) -> &'static str {
        match self {
            Self::PaymentDeadline => {
                "status = 'waiting_for_payment' AND payment_status = 'pending' \
                 AND payment_deadline IS NOT NULL AND payment_deadline < $1"
            }
            Self::QrCode => {
                "payment_method = 'qris' AND payment_status = 'pending' \
                 AND status <> 'cancelled' \
                 AND qr_expires_at IS NOT NULL AND qr_expires_at < $1"
            }
        }
    }

    /// Customer-facing reason used in the cancellation notice.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::PaymentDeadline => "payment was not received before the deadline",
            Self::QrCode => "the QRIS payment code expired",
        }
    }
}

/// An order cancelled by a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
}

/// Why a staff status change was refused.
#[derive(Debug, thiserror::Error)]
pub enum StatusChangeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl From<sqlx::Error> for StatusChangeError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

#[derive(sqlx::FromRow)]
struct LockedOrder {
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: PaymentMethod,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of orders matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<OrderSummary>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM orders o JOIN users u ON u.id = o.user_id {ORDER_FILTER}"
        ))
        .bind(filter.status)
        .bind(filter.payment_status)
        .bind(filter.payment_method)
        .bind(search.as_deref())
        .fetch_one(self.pool)
        .await?;

        let orders = sqlx::query_as::<_, OrderSummary>(&format!(
            r"
            SELECT o.id, o.order_number, o.user_id, u.name AS customer_name,
                   u.email AS customer_email, o.total_amount, o.payment_method,
                   o.payment_status, o.status, o.created_at
            FROM orders o
            JOIN users u ON u.id = o.user_id
            {ORDER_FILTER}
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $5 OFFSET $6
            "
        ))
        .bind(filter.status)
        .bind(filter.payment_status)
        .bind(filter.payment_method)
        .bind(search.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(orders, page, total))
    }

    /// Order header only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Order header with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn get_detail(&self, id: OrderId) -> Result<OrderDetail, RepositoryError> {
        let order = self.get(id).await?;
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, price, quantity, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(OrderDetail::new(order, items))
    }

    /// Move an order to `next` on behalf of staff.
    ///
    /// Cancelling restores stock and fails a still-pending payment.
    /// Delivering a cash-on-delivery order also records the payment.
    ///
    /// # Errors
    ///
    /// Returns `StatusChangeError::Transition` if the move is not allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, StatusChangeError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_order(&mut tx, id).await?;
        current.status.transition(next)?;

        let collect_cod = next == OrderStatus::Delivered
            && current.payment_method == PaymentMethod::CashOnDelivery
            && current.payment_status == PaymentStatus::Pending;

        sqlx::query(
            r"
            UPDATE orders
            SET status = $2,
                cancelled_at = CASE WHEN $2 = 'cancelled'::order_status THEN NOW() ELSE cancelled_at END,
                payment_status = CASE
                    WHEN $3 THEN 'paid'::payment_status
                    WHEN $2 = 'cancelled'::order_status AND payment_status = 'pending' THEN 'failed'::payment_status
                    ELSE payment_status
                END,
                paid_at = CASE WHEN $3 THEN NOW() ELSE paid_at END,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(next)
        .bind(collect_cod)
        .execute(&mut *tx)
        .await?;

        if next.releases_stock() {
            restore_stock(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok(self.get(id).await?)
    }

    /// Change the payment status on behalf of staff.
    ///
    /// `paid` moves a waiting order to processing. `failed` or `expired`
    /// cancels a waiting order and restores its stock. Delivered and
    /// cancelled orders only accept `paid → refunded`.
    ///
    /// # Errors
    ///
    /// Returns `StatusChangeError::Transition` if the move is not allowed.
    pub async fn update_payment_status(
        &self,
        id: OrderId,
        next: PaymentStatus,
    ) -> Result<Order, StatusChangeError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_order(&mut tx, id).await?;
        current
            .payment_status
            .transition_for_order(current.status, next)?;

        let waiting = current.status == OrderStatus::WaitingForPayment;
        let order_status = match next {
            PaymentStatus::Paid if waiting => OrderStatus::Processing,
            PaymentStatus::Failed | PaymentStatus::Expired if waiting => OrderStatus::Cancelled,
            _ => current.status,
        };

        sqlx::query(
            r"
            UPDATE orders
            SET payment_status = $2,
                status = $3,
                paid_at = CASE WHEN $2 = 'paid'::payment_status THEN NOW() ELSE paid_at END,
                cancelled_at = CASE WHEN $4 THEN NOW() ELSE cancelled_at END,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(next)
        .bind(order_status)
        .bind(order_status != current.status && order_status.releases_stock())
        .execute(&mut *tx)
        .await?;

        if order_status != current.status && order_status.releases_stock() {
            restore_stock(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok(self.get(id).await?)
    }

    /// IDs of orders a sweep of `kind` should expire at `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn due_for_expiry(
        &self,
        kind: ExpiryKind,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OrderId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, OrderId>(&format!(
            "SELECT id FROM orders WHERE {} ORDER BY id LIMIT $2",
            kind.predicate()
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Expire one order in its own transaction.
    ///
    /// Re-checks the sweep condition under `FOR UPDATE SKIP LOCKED`; returns
    /// `None` when the order was paid, cancelled or is locked by someone else
    /// in the meantime.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    pub async fn expire(
        &self,
        id: OrderId,
        kind: ExpiryKind,
        now: DateTime<Utc>,
    ) -> Result<Option<ExpiredOrder>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(UserId, String)> = sqlx::query_as(&format!(
            "SELECT user_id, order_number FROM orders WHERE id = $2 AND {} FOR UPDATE SKIP LOCKED",
            kind.predicate()
        ))
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id, order_number)) = row else {
            return Ok(None);
        };

        sqlx::query(
            r"
            UPDATE orders
            SET status = 'cancelled', payment_status = 'expired',
                cancelled_at = $2, updated_at = $2
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        restore_stock(&mut tx, id).await?;

        notifications::insert(
            &mut *tx,
            user_id,
            NotificationKind::Order,
            "Order cancelled",
            &format!("Order {order_number} was cancelled because {}.", kind.reason()),
            Some(id),
        )
        .await?;

        tx.commit().await?;

        Ok(Some(ExpiredOrder {
            id,
            user_id,
            order_number,
        }))
    }
}

async fn lock_order(conn: &mut PgConnection, id: OrderId) -> Result<LockedOrder, RepositoryError> {
    sqlx::query_as::<_, LockedOrder>(
        "SELECT status, payment_status, payment_method FROM orders WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Put every line's quantity back on its product's shelf.
///
/// Lines whose product was deleted are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn restore_stock(conn: &mut PgConnection, order_id: OrderId) -> Result<u64, RepositoryError> {
    let result = sqlx::query(RESTORE_STOCK_SQL)
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_bind_now_as_first_parameter() {
        for kind in [ExpiryKind::PaymentDeadline, ExpiryKind::QrCode] {
            assert!(kind.predicate().contains("< $1"));
            assert!(kind.predicate().contains("payment_status = 'pending'"));
        }
    }

    #[test]
    fn test_qr_predicate_only_targets_qris() {
        assert!(ExpiryKind::QrCode.predicate().contains("payment_method = 'qris'"));
        assert!(!ExpiryKind::PaymentDeadline.predicate().contains("qris"));
    }
}
