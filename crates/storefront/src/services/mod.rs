//! Business logic that spans repositories or talks to the outside world.

pub mod auth;
pub mod catalog_cache;
pub mod checkout;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use catalog_cache::CatalogCache;
pub use checkout::CheckoutError;
pub use email::EmailService;
