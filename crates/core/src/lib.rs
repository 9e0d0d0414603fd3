//! Bloom Bouquet Core - Shared domain types and rules.
//!
//! This crate provides common types used across all Bloom Bouquet components:
//! - `storefront` - Customer-facing shop API
//! - `admin` - Internal administration API
//! - `cli` - Maintenance commands (migrations, sweeps, slug backfills)
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. Anything that needs a clock or a random number
//! generator takes it as an argument, which keeps the rules testable.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money, emails, slugs, statuses, order and OTP rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
