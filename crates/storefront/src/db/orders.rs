//! Customer orders: history, cancellation and the checkout statements.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use bloom_bouquet_core::types::order::RESTORE_STOCK_SQL;
use bloom_bouquet_core::{
    Money, OrderId, OrderLine, OrderNumber, OrderStatus, OrderTotals, Page, PageRequest,
    PaymentMethod, PaymentSchedule, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{Order, OrderDetail, OrderItem, OrderSummary};

const ORDER_COLUMNS: &str = r"
    id, order_number, shipping_name, shipping_phone, shipping_address, notes,
    subtotal, shipping_cost, total_amount, payment_method, payment_status, status,
    payment_deadline, qr_expires_at, paid_at, cancelled_at, created_at
";

/// A cart line with its product, locked for checkout.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Money,
    pub stock: i32,
    pub is_active: bool,
    pub quantity: i32,
}

/// Header values for a new order.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub order_number: &'a OrderNumber,
    pub user_id: UserId,
    pub shipping_name: &'a str,
    pub shipping_phone: &'a str,
    pub shipping_address: &'a str,
    pub notes: Option<&'a str>,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub schedule: PaymentSchedule,
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<OrderSummary>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user)
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, OrderSummary>(
            r"
            SELECT o.id, o.order_number, o.total_amount, o.payment_method,
                   o.payment_status, o.status, o.created_at,
                   COALESCE((SELECT SUM(quantity) FROM order_items WHERE order_id = o.id), 0)::bigint
                       AS item_count
            FROM orders o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(orders, page, total))
    }

    /// One of the customer's orders with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist or
    /// belongs to someone else.
    pub async fn get_by_number(
        &self,
        user: UserId,
        order_number: &str,
    ) -> Result<OrderDetail, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 AND user_id = $2"
        ))
        .bind(order_number)
        .bind(user)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, product_id, product_name, price, quantity, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order.id)
        .fetch_all(self.pool)
        .await?;

        Ok(OrderDetail::new(order, items))
    }

    /// Cancel an order that is still waiting for payment, fail its payment
    /// and put its items back in stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not the customer's,
    /// or `RepositoryError::Conflict` if it has moved past waiting for payment.
    pub async fn cancel(
        &self,
        user: UserId,
        order_number: &str,
        now: DateTime<Utc>,
    ) -> Result<OrderDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(OrderId, OrderStatus)> = sqlx::query_as(
            "SELECT id, status FROM orders WHERE order_number = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(order_number)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await?;

        let (id, status) = row.ok_or(RepositoryError::NotFound)?;
        if status != OrderStatus::WaitingForPayment {
            return Err(RepositoryError::Conflict(format!(
                "Orders that are {} can no longer be cancelled",
                status.label().to_lowercase()
            )));
        }

        sqlx::query(
            r"
            UPDATE orders
            SET status = 'cancelled', payment_status = 'failed',
                cancelled_at = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        restore_stock(&mut tx, id).await?;
        tx.commit().await?;

        self.get_by_number(user, order_number).await
    }
}

/// Lock the customer's cart lines and their products, in product order so
/// concurrent checkouts lock rows in the same sequence.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_cart(
    conn: &mut PgConnection,
    user: UserId,
) -> Result<Vec<LockedLine>, RepositoryError> {
    let lines = sqlx::query_as::<_, LockedLine>(
        r"
        SELECT ct.product_id, p.name AS product_name, p.price, p.stock, p.is_active, ct.quantity
        FROM carts ct
        JOIN products p ON p.id = ct.product_id
        WHERE ct.user_id = $1
        ORDER BY ct.product_id
        FOR UPDATE OF ct, p
        ",
    )
    .bind(user)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Insert the order header. Returns `None` if the order number is taken.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
) -> Result<Option<OrderId>, RepositoryError> {
    let id = sqlx::query_scalar(
        r"
        INSERT INTO orders (
            order_number, user_id, shipping_name, shipping_phone, shipping_address, notes,
            subtotal, shipping_cost, total_amount, payment_method, status,
            payment_deadline, qr_expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (order_number) DO NOTHING
        RETURNING id
        ",
    )
    .bind(order.order_number.as_str())
    .bind(order.user_id)
    .bind(order.shipping_name)
    .bind(order.shipping_phone)
    .bind(order.shipping_address)
    .bind(order.notes)
    .bind(order.totals.subtotal)
    .bind(order.totals.shipping_cost)
    .bind(order.totals.total)
    .bind(order.payment_method)
    .bind(order.schedule.initial_status)
    .bind(order.schedule.payment_deadline)
    .bind(order.schedule.qr_expires_at)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

/// Insert one order line with its frozen name and price.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order: OrderId,
    product: ProductId,
    line: &OrderLine,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO order_items (order_id, product_id, product_name, price, quantity, subtotal)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(order)
    .bind(product)
    .bind(&line.product_name)
    .bind(line.price)
    .bind(line.quantity)
    .bind(line.subtotal())
    .execute(conn)
    .await?;
    Ok(())
}

/// Take `quantity` units out of stock. Returns `false` if there are not
/// enough left.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn take_stock(
    conn: &mut PgConnection,
    product: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products
        SET stock = stock - $2, updated_at = NOW()
        WHERE id = $1 AND is_active AND stock >= $2
        ",
    )
    .bind(product)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_cart(conn: &mut PgConnection, user: UserId) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM carts WHERE user_id = $1")
        .bind(user)
        .execute(conn)
        .await?;
    Ok(())
}

/// Return every line of an order to product stock.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn restore_stock(conn: &mut PgConnection, order: OrderId) -> Result<u64, RepositoryError> {
    let result = sqlx::query(RESTORE_STOCK_SQL)
        .bind(order)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
