//! Staff login and account errors.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bloom_bouquet_core::EmailError),

    /// Unknown email or wrong password; callers cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    WeakPassword(String),

    #[error("an admin with this email already exists")]
    AdminExists,

    #[error("password hashing failed")]
    PasswordHash,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
