//! Cart repository.
//!
//! Quantities are checked against stock when lines change; checkout checks
//! again under row locks since stock can move in between.

use sqlx::PgPool;

use bloom_bouquet_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItem;
use crate::models::cart::MAX_LINE_QUANTITY;

const CART_SELECT: &str = r"
    SELECT ct.id, ct.product_id, p.name AS product_name, p.slug AS product_slug,
           p.image, p.price, p.stock, p.is_active, ct.quantity
    FROM carts ct
    JOIN products p ON p.id = ct.product_id
";

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The customer's cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, user: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "{CART_SELECT} WHERE ct.user_id = $1 ORDER BY ct.created_at, ct.id"
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Add `quantity` units, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist, or
    /// `RepositoryError::Conflict` if it is inactive or the line would exceed
    /// stock.
    pub async fn add(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let stock = available_stock(&mut *tx, product).await?;

        let merged: i32 = sqlx::query_scalar(
            r"
            INSERT INTO carts (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id) DO UPDATE
            SET quantity = carts.quantity + EXCLUDED.quantity, updated_at = NOW()
            RETURNING quantity
            ",
        )
        .bind(user)
        .bind(product)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        check_quantity(merged, stock)?;
        tx.commit().await?;
        Ok(())
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart,
    /// or `RepositoryError::Conflict` if `quantity` exceeds stock.
    pub async fn set_quantity(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let stock = available_stock(&mut *tx, product).await?;
        check_quantity(quantity, stock)?;

        let updated = sqlx::query(
            r"
            UPDATE carts SET quantity = $3, updated_at = NOW()
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user)
        .bind(product)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    pub async fn remove(&self, user: UserId, product: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = $1 AND product_id = $2")
            .bind(user)
            .bind(product)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the cart. Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Stock of an active product.
async fn available_stock(
    conn: &mut sqlx::PgConnection,
    product: ProductId,
) -> Result<i32, RepositoryError> {
    let row: Option<(i32, bool)> =
        sqlx::query_as("SELECT stock, is_active FROM products WHERE id = $1")
            .bind(product)
            .fetch_optional(conn)
            .await?;
    match row {
        None => Err(RepositoryError::NotFound),
        Some((_, false)) => Err(RepositoryError::Conflict(
            "This product is no longer available".to_string(),
        )),
        Some((stock, true)) => Ok(stock),
    }
}

fn check_quantity(quantity: i32, stock: i32) -> Result<(), RepositoryError> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(RepositoryError::Conflict(format!(
            "At most {MAX_LINE_QUANTITY} of one product per order"
        )));
    }
    if quantity > stock {
        return Err(RepositoryError::Conflict(format!(
            "Only {stock} left in stock"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quantity() {
        assert!(check_quantity(3, 3).is_ok());
        assert!(matches!(
            check_quantity(4, 3),
            Err(RepositoryError::Conflict(msg)) if msg == "Only 3 left in stock"
        ));
        assert!(check_quantity(MAX_LINE_QUANTITY + 1, 1000).is_err());
    }
}
