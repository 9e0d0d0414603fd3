//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/login                     - Email/password login
//! POST /auth/logout                    - Logout
//! GET  /auth/me                        - Current admin
//!
//! # API (admin session required)
//! GET  /api/dashboard                  - Counters, recent orders, low stock
//! GET|POST /api/categories             - List / create categories
//! GET|PUT|DELETE /api/categories/{id}  - Show / update / delete
//! POST /api/categories/{id}/image      - Upload category image
//! GET|POST /api/products               - List (filter + paging) / create
//! GET|PUT|DELETE /api/products/{id}    - Show / update / delete
//! POST /api/products/{id}/image        - Upload product image
//! PATCH /api/products/{id}/stock       - Set or adjust stock
//! GET  /api/orders                     - List (filter + paging)
//! GET  /api/orders/{id}                - Order with lines
//! PATCH /api/orders/{id}/status        - Change order status
//! PATCH /api/orders/{id}/payment-status - Change payment status
//! POST /api/orders/sweep               - Run both expiry sweeps now
//! GET|POST /api/carousels              - List / create slides
//! GET|PUT|DELETE /api/carousels/{id}   - Show / update / delete
//! POST /api/carousels/{id}/image       - Upload slide image
//! GET  /api/customers                  - List (search + paging)
//! GET|DELETE /api/customers/{id}       - Show with orders / delete
//! GET|POST /api/notifications          - List / send or broadcast
//! DELETE /api/notifications/{id}       - Delete
//! GET|POST /api/reports                - List / generate
//! GET|DELETE /api/reports/{id}         - Show / delete
//! GET  /api/chat                       - Conversations
//! GET|POST /api/chat/{user_id}         - Thread / reply
//!
//! # Admin Users (super admin only)
//! GET|POST /api/admin-users            - List / create
//! DELETE /api/admin-users/{id}         - Remove
//! ```

pub mod admin_users;
pub mod auth;
pub mod carousels;
pub mod categories;
pub mod chat;
pub mod customers;
pub mod dashboard;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reports;

use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the complete application router (without health checks or
/// static uploads, which `main` adds).
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(carousels::router())
        .merge(customers::router())
        .merge(notifications::router())
        .merge(reports::router())
        .merge(chat::router())
        .merge(admin_users::router())
}

pub(crate) fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}
