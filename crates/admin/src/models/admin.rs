//! Admin account domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bloom_bouquet_core::{AdminId, AdminRole, Email};

/// A staff account (domain type). The password hash never leaves the
/// repository.
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: AdminId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}
