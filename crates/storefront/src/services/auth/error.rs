//! Authentication error types.

use thiserror::Error;

use bloom_bouquet_core::OtpError;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Errors that can occur during registration, verification and login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bloom_bouquet_core::EmailError),

    /// Wrong password or unknown email.
    #[error("These credentials do not match our records")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    UserAlreadyExists,

    #[error("Please verify your email address before logging in")]
    EmailNotVerified,

    #[error("This email address is already verified")]
    AlreadyVerified,

    #[error("{0}")]
    WeakPassword(String),

    /// Code rejected: malformed, wrong, expired, burned or resent too soon.
    #[error("{0}")]
    Otp(#[from] OtpError),

    #[error("No verification code is pending for this email")]
    NoPendingCode,

    #[error("email delivery failed: {0}")]
    Email(#[from] EmailError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}
