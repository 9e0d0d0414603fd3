//! Customer accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{Email, UserId};

use super::session::CurrentUser;
use crate::error::FieldErrors;

/// Longest accepted name, phone or address field.
pub const MAX_FIELD_LENGTH: usize = 255;

/// A customer as returned by `/api/auth/me` and `/api/profile`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Identity to keep in the session.
    #[must_use]
    pub fn to_current(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Body of `PUT /api/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ProfileInput {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "The name field is required.");
        if self.name.chars().count() > MAX_FIELD_LENGTH {
            errors.add("name", "The name may not be greater than 255 characters.");
        }
        if self
            .phone
            .as_deref()
            .is_some_and(|p| p.chars().count() > 20 || !p.chars().all(is_phone_char))
        {
            errors.add("phone", "The phone format is invalid.");
        }
        errors
    }
}

/// Digits plus the separators people type into phone fields.
#[must_use]
pub const fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, phone: Option<&str>) -> ProfileInput {
        ProfileInput {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            address: None,
        }
    }

    #[test]
    fn test_profile_validation() {
        assert!(input("Sari", Some("+62 812-3456-7890")).validate().is_empty());
        assert!(input("", None).validate().get("name").is_some());
        assert!(input("Sari", Some("call me")).validate().get("phone").is_some());
    }
}
