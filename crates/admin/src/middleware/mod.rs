//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Auth extractors on handlers (`RequireAdminAuth`, `RequireSuperAdmin`)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireSuperAdmin, clear_current_admin, set_current_admin,
};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
