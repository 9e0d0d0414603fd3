//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Staff email/password authentication
//! - `notifications` - Customer notification dispatch
//! - `order_expiry` - Sweeps that cancel unpaid orders past their deadline
//! - `reports` - Sales and product report generation
//! - `slugs` - Slug backfill for legacy rows
//! - `uploads` - Image upload validation and storage

pub mod auth;
pub mod notifications;
pub mod order_expiry;
pub mod reports;
pub mod slugs;
pub mod uploads;

pub use auth::{AuthError, AuthService};
pub use order_expiry::{SweepError, SweepKind, SweepReport, run_sweep, spawn_sweeper};
pub use reports::ReportRequest;
pub use uploads::{UploadError, UploadFolder};
