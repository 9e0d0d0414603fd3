//! Pending email verification codes.
//!
//! One row per email. Codes are stored as SHA-256 hex digests, never in
//! clear.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bloom_bouquet_core::{Email, OtpError, OtpState};

use super::RepositoryError;
use crate::models::User;

#[derive(sqlx::FromRow)]
struct OtpRow {
    code_hash: String,
    expires_at: DateTime<Utc>,
    attempts: i32,
    created_at: DateTime<Utc>,
}

impl From<OtpRow> for OtpState {
    fn from(row: OtpRow) -> Self {
        Self {
            code_hash: row.code_hash,
            expires_at: row.expires_at,
            attempts: row.attempts,
            created_at: row.created_at,
        }
    }
}

/// Result of submitting a code.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// Code accepted; the account is now verified and the code deleted.
    Verified(User),
    /// Code refused. Mismatches have already been counted.
    Rejected(OtpError),
    /// Nothing outstanding for this email.
    NoPendingCode,
}

pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, email: &Email) -> Result<Option<OtpState>, RepositoryError> {
        let row = sqlx::query_as::<_, OtpRow>(
            "SELECT code_hash, expires_at, attempts, created_at FROM email_otps WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(OtpState::from))
    }

    /// Replace whatever code is outstanding for `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn store(&self, email: &Email, state: &OtpState) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO email_otps (email, code_hash, expires_at, attempts, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET code_hash = EXCLUDED.code_hash,
                expires_at = EXCLUDED.expires_at,
                attempts = EXCLUDED.attempts,
                created_at = EXCLUDED.created_at
            ",
        )
        .bind(email)
        .bind(&state.code_hash)
        .bind(state.expires_at)
        .bind(state.attempts)
        .bind(state.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Check `submitted_hash` under a row lock.
    ///
    /// A mismatch bumps `attempts`; success deletes the code and stamps
    /// `users.email_verified_at` in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails, or
    /// `RepositoryError::NotFound` if the code exists but the account does not.
    pub async fn verify(
        &self,
        email: &Email,
        submitted_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let Some(state) = sqlx::query_as::<_, OtpRow>(
            r"
            SELECT code_hash, expires_at, attempts, created_at
            FROM email_otps
            WHERE email = $1
            FOR UPDATE
            ",
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?
        .map(OtpState::from) else {
            return Ok(VerifyOutcome::NoPendingCode);
        };

        match state.check(submitted_hash, now) {
            Ok(()) => {}
            Err(OtpError::Mismatch) => {
                sqlx::query("UPDATE email_otps SET attempts = attempts + 1 WHERE email = $1")
                    .bind(email)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                return Ok(VerifyOutcome::Rejected(OtpError::Mismatch));
            }
            Err(other) => return Ok(VerifyOutcome::Rejected(other)),
        }

        sqlx::query("DELETE FROM email_otps WHERE email = $1")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET email_verified_at = COALESCE(email_verified_at, $2), updated_at = NOW()
            WHERE email = $1
            RETURNING id, name, email, phone, address, email_verified_at, created_at, updated_at
            ",
        )
        .bind(email)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(VerifyOutcome::Verified(user))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, email: &Email) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM email_otps WHERE email = $1")
            .bind(email)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
