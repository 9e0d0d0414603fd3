//! Shopping cart.

use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{CartItemId, Money, ProductId};

/// Most units of one product a cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// One cart line joined with its product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: Option<String>,
    pub image: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub is_active: bool,
    pub quantity: i32,
}

impl CartItem {
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.price.times(self.quantity)
    }

    /// Whether checkout would accept this line as it stands.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.is_active && self.stock >= self.quantity
    }
}

/// The customer's cart with totals.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub subtotal: Money,
}

impl Cart {
    #[must_use]
    pub fn new(items: Vec<CartItem>) -> Self {
        let item_count = items.iter().map(|i| i64::from(i.quantity)).sum();
        let subtotal = items.iter().map(CartItem::subtotal).sum();
        Self {
            items,
            item_count,
            subtotal,
        }
    }
}

/// Body of `POST /api/cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
}

/// Body of `PUT /api/cart/{product_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetQuantity {
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use bloom_bouquet_core::{CartItemId, ProductId};

    use super::*;

    fn item(price: i64, quantity: i32, stock: i32) -> CartItem {
        CartItem {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            product_name: "Tulip Bundle".to_string(),
            product_slug: Some("tulip-bundle".to_string()),
            image: None,
            price: Money::from_rupiah(price),
            stock,
            is_active: true,
            quantity,
        }
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart::new(vec![item(120_000, 2, 10), item(35_000, 1, 10)]);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal, Money::from_rupiah(275_000));
    }

    #[test]
    fn test_availability() {
        assert!(item(1, 2, 2).is_available());
        assert!(!item(1, 3, 2).is_available());
    }

    #[test]
    fn test_add_defaults_to_one() {
        let body: AddToCart = serde_json::from_str(r#"{"product_id": 4}"#).expect("body");
        assert_eq!(body.quantity, 1);
    }
}
