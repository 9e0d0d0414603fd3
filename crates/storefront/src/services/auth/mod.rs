//! Customer authentication.
//!
//! Registration creates an unverified account and emails a six digit code.
//! The code is stored as a SHA-256 digest; the account can log in once the
//! code has been verified.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use bloom_bouquet_core::{Email, OtpCode, OtpState};

use crate::db::RepositoryError;
use crate::db::otps::{OtpRepository, VerifyOutcome};
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;
use crate::services::email::{EmailService, generate_otp};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration details, already checked for required fields.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    otps: OtpRepository<'a>,
    mailer: &'a EmailService,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, mailer: &'a EmailService) -> Self {
        Self {
            users: UserRepository::new(pool),
            otps: OtpRepository::new(pool),
            mailer,
        }
    }

    /// Create an unverified account and email it a code.
    ///
    /// Registering again with an email that never verified only sends a
    /// fresh code, under the same cooldown as a resend. The stored name,
    /// phone and password stay as they were, so nobody can swap the
    /// password of an account they cannot receive mail for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if a verified account has this
    /// email, `AuthError::Otp(ResendTooSoon)` inside the cooldown,
    /// `AuthError::WeakPassword` or `AuthError::InvalidEmail` for bad input,
    /// and `AuthError::Email` if the code could not be sent.
    pub async fn register(&self, registration: &Registration<'_>, now: DateTime<Utc>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;

        let new_user = NewUser {
            name: registration.name.trim(),
            email: &email,
            phone: registration.phone.map(str::trim).filter(|p| !p.is_empty()),
            password_hash: &password_hash,
        };

        let user = match self.users.create(&new_user).await {
            Ok(user) => user,
            Err(RepositoryError::Conflict(_)) => {
                let user = self
                    .users
                    .get_by_email(&email)
                    .await?
                    .filter(|user| !user.is_verified())
                    .ok_or(AuthError::UserAlreadyExists)?;
                self.check_cooldown(&email, now).await?;
                tracing::info!(user_id = %user.id, "Repeated registration for unverified account");
                user
            }
            Err(e) => return Err(e.into()),
        };

        self.issue_code(&user, now).await?;
        tracing::info!(user_id = %user.id, "Verification code sent");
        Ok(user)
    }

    /// Check a submitted code and verify the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Otp` for malformed, wrong, expired or exhausted
    /// codes and `AuthError::NoPendingCode` if nothing was issued.
    pub async fn verify_otp(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let code = OtpCode::parse(code)?;

        match self.otps.verify(&email, &hash_code(&code), now).await? {
            VerifyOutcome::Verified(user) => {
                tracing::info!(user_id = %user.id, "Email verified");
                Ok(user)
            }
            VerifyOutcome::Rejected(reason) => {
                tracing::info!(reason = %reason, "Verification code rejected");
                Err(reason.into())
            }
            VerifyOutcome::NoPendingCode => Err(AuthError::NoPendingCode),
        }
    }

    /// Send a new code, at most once per cooldown window.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyVerified` for verified accounts,
    /// `AuthError::InvalidCredentials` for unknown emails and
    /// `AuthError::Otp(ResendTooSoon)` inside the cooldown.
    pub async fn resend_otp(&self, email: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.is_verified() {
            return Err(AuthError::AlreadyVerified);
        }
        self.check_cooldown(&email, now).await?;

        self.issue_code(&user, now).await
    }

    /// Password login. Unverified accounts are refused.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password,
    /// and `AuthError::EmailNotVerified` if the password is right but the
    /// email was never verified.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_verified() {
            return Err(AuthError::EmailNotVerified);
        }
        Ok(user)
    }

    async fn check_cooldown(&self, email: &Email, now: DateTime<Utc>) -> Result<(), AuthError> {
        if let Some(pending) = self.otps.get(email).await? {
            pending.check_resend(now)?;
        }
        Ok(())
    }

    async fn issue_code(&self, user: &User, now: DateTime<Utc>) -> Result<(), AuthError> {
        let code = generate_otp();
        let state = OtpState::issue(hash_code(&code), now);
        self.otps.store(&user.email, &state).await?;

        if let Err(e) = self.mailer.send_otp(user.email.as_str(), &user.name, &code).await {
            // Drop the unsent code so the cooldown doesn't block a retry.
            self.otps.delete(&user.email).await?;
            return Err(e.into());
        }
        Ok(())
    }
}

/// SHA-256 hex digest of a code, as stored in `email_otps.code_hash`.
#[must_use]
pub fn hash_code(code: &OtpCode) -> String {
    hex::encode(Sha256::digest(code.as_str().as_bytes()))
}

/// Validate password meets minimum requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "The password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password is wrong, or
/// `AuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_code_is_sha256_hex() {
        let code = OtpCode::parse("123456").expect("code");
        assert_eq!(
            hash_code(&code),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("mawar-merah-2026").expect("hash");
        assert!(verify_password("mawar-merah-2026", &hash).is_ok());
        assert!(matches!(
            verify_password("melati-putih", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }
}
