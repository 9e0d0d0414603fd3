//! Session-related types.

use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{Email, UserId};

/// Session-stored customer identity.
///
/// Only verified customers are ever written here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_USER: &str = "current_user";
}
