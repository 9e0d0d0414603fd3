//! Domain models for the storefront.
//!
//! Row types come straight out of `sqlx::FromRow` and are serialized to the
//! client as-is; request payloads live next to the rows they change.

pub mod cart;
pub mod catalog;
pub mod chat;
pub mod notification;
pub mod order;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use catalog::{Carousel, Category, Product, ProductFilter, ProductSort};
pub use chat::ChatMessage;
pub use notification::Notification;
pub use order::{CheckoutRequest, Order, OrderDetail, OrderItem, OrderSummary};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{ProfileInput, User};
