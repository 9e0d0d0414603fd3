//! Catalog seeding from YAML.
//!
//! ```yaml
//! categories:
//!   - name: Bouquets
//!     description: Hand-tied arrangements
//!     products:
//!       - name: Red Rose Bouquet
//!         price: 250000
//!         stock: 12
//!         featured: true
//! ```
//!
//! Re-running is safe: categories and products that already exist (same
//! name, case-insensitive) are skipped, never updated.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;

use bloom_bouquet_admin::db::{CategoryRepository, ProductRepository};
use bloom_bouquet_admin::models::{CategoryInput, ProductInput};
use bloom_bouquet_core::{CategoryId, Money};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Whole rupiah.
    pub price: i64,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub products_created: usize,
    pub products_skipped: usize,
}

/// Problems that make the file unusable, checked before touching the database.
#[must_use]
pub fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut category_names = HashSet::new();
    let mut product_names = HashSet::new();

    for category in &seed.categories {
        let name = category.name.trim();
        if name.is_empty() {
            errors.push("category with an empty name".to_string());
        } else if !category_names.insert(name.to_lowercase()) {
            errors.push(format!("duplicate category '{name}'"));
        }

        for product in &category.products {
            let product_name = product.name.trim();
            if product_name.is_empty() {
                errors.push(format!("product with an empty name in '{name}'"));
                continue;
            }
            if !product_names.insert(product_name.to_lowercase()) {
                errors.push(format!("duplicate product '{product_name}'"));
            }
            if product.price < 0 {
                errors.push(format!("'{product_name}': price must not be negative"));
            }
            if product.stock < 0 {
                errors.push(format!("'{product_name}': stock must not be negative"));
            }
        }
    }
    errors
}

async fn existing_category(pool: &PgPool, name: &str) -> Result<Option<CategoryId>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM categories WHERE LOWER(name) = LOWER($1) LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

async fn product_exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE LOWER(name) = LOWER($1))")
        .bind(name)
        .fetch_one(pool)
        .await
}

/// Seed categories and products from `file_path`.
///
/// # Errors
///
/// Returns an error if the file is missing, malformed or fails validation,
/// or if a database operation fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    tracing::info!(path = %file_path, "Loading catalog seed");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        tracing::error!("Seed file validation failed:");
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    let report = apply(&pool, &seed).await?;

    tracing::info!(
        categories_created = report.categories_created,
        categories_skipped = report.categories_skipped,
        products_created = report.products_created,
        products_skipped = report.products_skipped,
        "Seeding complete"
    );
    Ok(())
}

async fn apply(pool: &PgPool, seed: &CatalogSeed) -> Result<SeedReport, Box<dyn std::error::Error>> {
    let categories = CategoryRepository::new(pool);
    let products = ProductRepository::new(pool);
    let mut report = SeedReport::default();

    for category in &seed.categories {
        let name = category.name.trim();
        let category_id = if let Some(id) = existing_category(pool, name).await? {
            report.categories_skipped += 1;
            id
        } else {
            let created = categories
                .create(&CategoryInput {
                    name: name.to_string(),
                    slug: category.slug.clone(),
                    description: category.description.clone(),
                })
                .await?;
            tracing::info!(category = %name, slug = ?created.slug, "Created category");
            report.categories_created += 1;
            created.id
        };

        for product in &category.products {
            let product_name = product.name.trim();
            if product_exists(pool, product_name).await? {
                report.products_skipped += 1;
                continue;
            }
            products
                .create(&ProductInput {
                    category_id: Some(category_id),
                    name: product_name.to_string(),
                    slug: product.slug.clone(),
                    description: product.description.clone(),
                    price: Money::from_rupiah(product.price),
                    stock: product.stock,
                    is_active: true,
                    is_featured: product.featured,
                })
                .await?;
            report.products_created += 1;
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
categories:
  - name: Bouquets
    description: Hand-tied arrangements
    products:
      - name: Red Rose Bouquet
        price: 250000
        stock: 12
        featured: true
      - name: Sunflower Joy
        price: 180000
  - name: Plants
";

    #[test]
    fn test_parses_sample() {
        let seed: CatalogSeed = serde_yaml::from_str(SAMPLE).expect("yaml");
        assert_eq!(seed.categories.len(), 2);
        assert_eq!(seed.categories[0].products.len(), 2);
        assert!(seed.categories[0].products[0].featured);
        assert_eq!(seed.categories[0].products[1].stock, 0);
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let yaml = "categories:\n  - name: Bouquets\n    colour: red\n";
        assert!(serde_yaml::from_str::<CatalogSeed>(yaml).is_err());
    }

    #[test]
    fn test_validate_catches_duplicates_and_negatives() {
        let yaml = r"
categories:
  - name: Bouquets
    products:
      - name: Lily
        price: -1
  - name: bouquets
    products:
      - name: lily
        price: 1000
        stock: -2
";
        let seed: CatalogSeed = serde_yaml::from_str(yaml).expect("yaml");
        let errors = validate(&seed);
        assert!(errors.contains(&"duplicate category 'bouquets'".to_string()));
        assert!(errors.contains(&"duplicate product 'lily'".to_string()));
        assert!(errors.contains(&"'Lily': price must not be negative".to_string()));
        assert!(errors.contains(&"'lily': stock must not be negative".to_string()));
    }
}
