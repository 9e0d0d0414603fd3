//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited)
//! POST /api/auth/register              - Create account, email a code
//! POST /api/auth/verify-otp            - Verify email, log in
//! POST /api/auth/resend-otp            - Send a fresh code
//! POST /api/auth/login                 - Email/password login
//! POST /api/auth/logout                - Logout
//! GET  /api/auth/me                    - Current customer
//!
//! # Catalog (public)
//! GET  /api/categories                 - Active categories
//! GET  /api/categories/{slug}/products - Products in a category
//! GET  /api/products                   - Search, filter, sort, paging
//! GET  /api/products/{slug}            - Product with related products
//! GET  /api/carousels                  - Home page slides
//!
//! # Account (customer session required)
//! PUT  /api/profile                    - Update name, phone, address
//! GET|POST|DELETE /api/cart            - Show / add / empty
//! PUT|DELETE /api/cart/{product_id}    - Set quantity / remove line
//! GET  /api/favorites                  - Favorite products
//! POST|DELETE /api/favorites/{product_id}
//! POST /api/checkout                   - Place an order from the cart
//! GET  /api/orders                     - Order history
//! GET  /api/orders/{order_number}      - Order with lines
//! POST /api/orders/{order_number}/cancel
//! GET  /api/notifications              - Inbox
//! GET  /api/notifications/unread-count
//! POST /api/notifications/{id}/read
//! POST /api/notifications/read-all
//! GET|POST /api/chat                   - Support thread / send
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod favorites;
pub mod notifications;
pub mod orders;
pub mod profile;

use axum::Router;

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Build the complete API router (without health checks, which `lib` adds).
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router().layer(auth_rate_limiter()))
        .merge(profile::router())
        .merge(catalog::router())
        .merge(cart::router())
        .merge(favorites::router())
        .merge(orders::router())
        .merge(notifications::router())
        .merge(chat::router())
}

pub(crate) fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}
