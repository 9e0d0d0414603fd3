//! Public catalog views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{CarouselId, CategoryId, Money, ProductId};

/// A category with the number of active products in it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub product_count: i64,
}

/// An active product as customers see it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub image: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Listing order for `GET /api/products`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// `ORDER BY` clause; never built from user text.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price ASC, p.id ASC",
            Self::PriceDesc => "p.price DESC, p.id DESC",
            Self::Name => "p.name ASC, p.id ASC",
        }
    }
}

/// Query string of `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub sort: ProductSort,
}

/// A homepage banner.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Carousel {
    pub id: CarouselId,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub sort_order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parses_snake_case() {
        let filter: ProductFilter =
            serde_json::from_str(r#"{"sort": "price_desc"}"#).expect("filter");
        assert_eq!(filter.sort, ProductSort::PriceDesc);
        assert_eq!(ProductFilter::default().sort, ProductSort::Newest);
    }
}
