//! Slug allocation against the `products` and `categories` tables.

use std::collections::HashSet;

use sqlx::{PgConnection, PgExecutor};

use bloom_bouquet_core::Slug;

use super::{RepositoryError, like_pattern_prefix};

/// Tables that carry a unique nullable `slug` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugTable {
    Products,
    Categories,
}

impl SlugTable {
    const fn table(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
        }
    }

    /// Slug used when a name has no usable characters.
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::Products => "product",
            Self::Categories => "category",
        }
    }
}

/// Pick a free slug for `base` in `table`, ignoring the row `exclude_id`
/// (the row being updated).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the lookup fails.
pub async fn allocate<'e>(
    executor: impl PgExecutor<'e>,
    table: SlugTable,
    base: &Slug,
    exclude_id: Option<i32>,
) -> Result<Slug, RepositoryError> {
    let sql = format!(
        r"
        SELECT slug FROM {}
        WHERE (slug = $1 OR slug LIKE $2 ESCAPE '\')
          AND ($3::int IS NULL OR id <> $3)
        ",
        table.table()
    );
    let taken: Vec<String> = sqlx::query_scalar(&sql)
        .bind(base.as_str())
        .bind(like_pattern_prefix(&format!("{}-", base.as_str())))
        .bind(exclude_id)
        .fetch_all(executor)
        .await?;

    let taken: HashSet<String> = taken.into_iter().collect();
    Ok(Slug::unique_among(base, &taken))
}

/// Rows whose slug is missing or blank, as `(id, name)`, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn missing<'e>(
    executor: impl PgExecutor<'e>,
    table: SlugTable,
) -> Result<Vec<(i32, String)>, RepositoryError> {
    let sql = format!(
        "SELECT id, name FROM {} WHERE slug IS NULL OR btrim(slug) = '' ORDER BY id",
        table.table()
    );
    let rows = sqlx::query_as::<_, (i32, String)>(&sql)
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

/// Store a slug on one row.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if another row took the slug first.
pub async fn assign<'e>(
    executor: impl PgExecutor<'e>,
    table: SlugTable,
    id: i32,
    slug: &Slug,
) -> Result<(), RepositoryError> {
    let sql = format!(
        "UPDATE {} SET slug = $2, updated_at = NOW() WHERE id = $1",
        table.table()
    );
    sqlx::query(&sql)
        .bind(id)
        .bind(slug.as_str())
        .execute(executor)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;
    Ok(())
}

/// Derive the base slug for a create/update: an explicit slug wins over the
/// name, and empty results fall back to the table default.
#[must_use]
pub fn base_slug(table: SlugTable, name: &str, explicit: Option<&str>) -> Slug {
    explicit
        .and_then(Slug::from_name)
        .unwrap_or_else(|| Slug::from_name_or(name, table.fallback()))
}

/// Slug for a row being edited. The stored slug stays when the name is
/// unchanged and no explicit slug was sent; otherwise a free one is allocated.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the row does not exist.
pub async fn for_update(
    conn: &mut PgConnection,
    table: SlugTable,
    id: i32,
    name: &str,
    explicit: Option<&str>,
) -> Result<Slug, RepositoryError> {
    let sql = format!("SELECT name, slug FROM {} WHERE id = $1 FOR UPDATE", table.table());
    let (current_name, current_slug): (String, Option<String>) = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    if let Some(slug) = kept_slug(&current_name, current_slug.as_deref(), name, explicit) {
        return Ok(slug);
    }
    let base = base_slug(table, name, explicit);
    allocate(&mut *conn, table, &base, Some(id)).await
}

fn kept_slug(
    current_name: &str,
    current_slug: Option<&str>,
    name: &str,
    explicit: Option<&str>,
) -> Option<Slug> {
    if explicit.is_some_and(|s| !s.trim().is_empty()) || current_name != name.trim() {
        return None;
    }
    current_slug.and_then(Slug::from_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_slug_prefers_explicit() {
        let slug = base_slug(SlugTable::Products, "Red Roses", Some("Valentine Special"));
        assert_eq!(slug.as_str(), "valentine-special");
    }

    #[test]
    fn test_base_slug_ignores_blank_explicit() {
        let slug = base_slug(SlugTable::Products, "Red Roses", Some("  "));
        assert_eq!(slug.as_str(), "red-roses");
    }

    #[test]
    fn test_base_slug_fallbacks() {
        assert_eq!(base_slug(SlugTable::Products, "???", None).as_str(), "product");
        assert_eq!(base_slug(SlugTable::Categories, "", None).as_str(), "category");
    }

    #[test]
    fn test_unchanged_name_keeps_suffixed_slug() {
        let kept = kept_slug("Red Roses", Some("red-roses-1"), " Red Roses ", None);
        assert_eq!(kept.map(Slug::into_inner).as_deref(), Some("red-roses-1"));

        let blank = kept_slug("Red Roses", Some("red-roses-1"), "Red Roses", Some(" "));
        assert!(blank.is_some());
    }

    #[test]
    fn test_rename_or_explicit_slug_reallocates() {
        assert!(kept_slug("Red Roses", Some("red-roses-1"), "White Roses", None).is_none());
        assert!(kept_slug("Red Roses", Some("red-roses-1"), "Red Roses", Some("roses")).is_none());
        assert!(kept_slug("Red Roses", None, "Red Roses", None).is_none());
    }
}
