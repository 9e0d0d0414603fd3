//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{AdminId, AdminRole, Email};

use super::admin::Admin;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
}

impl From<&Admin> for CurrentAdmin {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
