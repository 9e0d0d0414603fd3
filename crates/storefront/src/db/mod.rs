//! Database operations for the storefront.
//!
//! The storefront shares the shop database with the admin API, which owns
//! the migrations. Customers only ever see their own rows: every repository
//! method that touches customer data takes the `UserId` from the session.
//!
//! # Tables read or written here
//!
//! - `users`, `email_otps` - Accounts and pending email verification
//! - `categories`, `products`, `carousels` - Catalog (read only)
//! - `carts`, `favorites` - Per-customer lists
//! - `orders`, `order_items` - Checkout and order history
//! - `notifications`, `chat_messages` - Customer inbox and support chat

pub mod carts;
pub mod catalog;
pub mod chat;
pub mod favorites;
pub mod notifications;
pub mod orders;
pub mod otps;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use chat::ChatRepository;
pub use favorites::FavoriteRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use otps::OtpRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Unique violations become `Conflict`, everything else stays `Database`.
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
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `%term%` with `ILIKE` wildcards in `term` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("lily"), "%lily%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
    }
}
