//! Catalog models: categories and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{CategoryId, Money, ProductId};

use crate::error::FieldErrors;

/// Longest accepted product or category name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Largest price a `NUMERIC(12,2)` column holds.
#[must_use]
pub fn max_price() -> Money {
    Money::new(Decimal::new(999_999_999_999, 2))
}

/// A product category, with the number of products filed under it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    /// Explicit slug; derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryInput {
    /// Collect field errors.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_name(&self.name, &mut errors);
        errors
    }
}

/// A product with its category name joined in.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub image: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

const fn default_true() -> bool {
    true
}

impl ProductInput {
    /// Collect field errors.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_name(&self.name, &mut errors);
        if self.price.is_negative() {
            errors.add("price", "The price must be at least 0.");
        } else if self.price > max_price() {
            errors.add(
                "price",
                format!("The price may not be greater than {}.", max_price().amount()),
            );
        }
        if self.stock < 0 {
            errors.add("stock", "The stock must be at least 0.");
        }
        errors
    }
}

/// Query string for the admin product list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive match on name or slug.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
    /// Only products with stock at or below this level.
    pub low_stock: Option<i32>,
}

fn validate_name(name: &str, errors: &mut FieldErrors) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.add("name", "The name field is required.");
    } else if trimmed.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            "name",
            format!("The name may not be greater than {MAX_NAME_LENGTH} characters."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64, stock: i32) -> ProductInput {
        ProductInput {
            category_id: None,
            name: name.to_string(),
            slug: None,
            description: None,
            price: Money::from_rupiah(price),
            stock,
            is_active: true,
            is_featured: false,
        }
    }

    #[test]
    fn test_product_input_valid() {
        assert!(product("Peony Box", 350_000, 4).validate().is_empty());
    }

    #[test]
    fn test_product_input_rejects_blank_name_and_negatives() {
        let errors = product("   ", -1, -2).validate();
        assert!(errors.get("name").is_some());
        assert!(errors.get("price").is_some());
        assert!(errors.get("stock").is_some());
    }

    #[test]
    fn test_product_price_upper_bound() {
        let mut input = product("Grand Arrangement", 0, 1);
        input.price = max_price();
        assert!(input.validate().is_empty());

        input.price = Money::from_rupiah(10_000_000_000);
        let errors = input.validate();
        assert!(errors.get("price").is_some());
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn test_category_name_length() {
        let input = CategoryInput {
            name: "x".repeat(MAX_NAME_LENGTH + 1),
            slug: None,
            description: None,
        };
        assert!(input.validate().get("name").is_some());
    }

    #[test]
    fn test_product_input_defaults() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name": "Tulip", "price": "125000"}"#).unwrap_or_else(|_| product("", 0, 0));
        assert_eq!(input.name, "Tulip");
        assert!(input.is_active);
        assert!(!input.is_featured);
        assert_eq!(input.stock, 0);
    }
}
