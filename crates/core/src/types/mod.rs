//! Core types for Bloom Bouquet.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod otp;
pub mod pagination;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use order::{OrderLine, OrderNumber, OrderTotals, PaymentSchedule};
pub use otp::{OtpCode, OtpError, OtpState};
pub use pagination::{Page, PageRequest};
pub use slug::{Slug, slugify};
pub use status::*;
