//! Domain models for admin.
//!
//! Row-shaped types returned by the repositories and serialized straight to
//! JSON, plus the request payloads that create or change them.

pub mod admin;
pub mod carousel;
pub mod catalog;
pub mod chat;
pub mod customer;
pub mod notification;
pub mod order;
pub mod report;
pub mod session;

pub use admin::Admin;
pub use carousel::{Carousel, CarouselInput};
pub use catalog::{Category, CategoryInput, Product, ProductFilter, ProductInput};
pub use chat::{ChatMessage, Conversation};
pub use customer::Customer;
pub use notification::{Notification, NotificationInput};
pub use order::{Order, OrderDetail, OrderFilter, OrderItem, OrderSummary};
pub use report::{DailySales, ProductStock, Report, SalesReportData, TopProduct};
pub use session::{CurrentAdmin, keys as session_keys};

// Re-export AdminRole from core for convenience
pub use bloom_bouquet_core::AdminRole;
