//! Database operations for the admin API.
//!
//! # Tables
//!
//! The admin surface reads and writes the whole shop schema:
//!
//! - `admins` - Staff accounts (argon2 password hashes)
//! - `categories`, `products`, `carousels` - Catalog
//! - `users` - Customers (read and delete only)
//! - `orders`, `order_items` - Orders placed through the storefront
//! - `notifications` - Customer notifications
//! - `reports` - Stored report snapshots (JSONB rows)
//! - `chat_messages` - Customer support chat
//! - `tower_sessions.session` - Session store
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p bloom-bouquet-cli -- migrate
//! ```

pub mod admins;
pub mod carousels;
pub mod categories;
pub mod chat;
pub mod customers;
pub mod dashboard;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reports;
pub mod slugs;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use carousels::CarouselRepository;
pub use categories::CategoryRepository;
pub use chat::ChatRepository;
pub use customers::CustomerRepository;
pub use dashboard::DashboardRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reports::ReportRepository;

/// Migrations embedded at build time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%`, `_` and `\` so user input can sit inside an `ILIKE` pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `%term%` for substring search.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// `prefix%` for prefix search.
pub(crate) fn like_pattern_prefix(prefix: &str) -> String {
    format!("{}%", escape_like(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rose"), "%rose%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern_prefix("rose-"), "rose-%");
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
    }
}
