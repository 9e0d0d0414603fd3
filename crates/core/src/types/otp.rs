//! One-time email verification codes.

use core::fmt;

use chrono::{DateTime, Duration, Utc};

/// Number of digits in a code.
pub const OTP_LENGTH: usize = 6;

/// How long a code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Wrong guesses allowed before a code is burned.
pub const OTP_MAX_ATTEMPTS: i32 = 5;

/// Minimum gap between two codes sent to the same address.
pub const OTP_RESEND_COOLDOWN_SECS: i64 = 60;

/// Reasons a submitted code is rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpError {
    #[error("verification code must be {OTP_LENGTH} digits")]
    Malformed,
    #[error("verification code has expired")]
    Expired,
    #[error("too many attempts, request a new code")]
    TooManyAttempts,
    #[error("verification code is incorrect")]
    Mismatch,
    #[error("please wait {retry_after_secs} seconds before requesting another code")]
    ResendTooSoon { retry_after_secs: i64 },
}

/// A syntactically valid six digit code.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parse user input, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::Malformed`] unless the input is exactly six ASCII
    /// digits.
    pub fn parse(input: &str) -> Result<Self, OtpError> {
        let trimmed = input.trim();
        if trimmed.len() == OTP_LENGTH && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(OtpError::Malformed)
        }
    }

    /// Wrap a generated number in `100_000..1_000_000`.
    #[must_use]
    pub fn from_number(n: u32) -> Self {
        Self(format!("{:06}", n % 1_000_000))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of logs.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}

/// Stored state of an outstanding code, as loaded from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpState {
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OtpState {
    /// Fresh state for a code issued at `now`.
    #[must_use]
    pub fn issue(code_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            code_hash,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
            attempts: 0,
            created_at: now,
        }
    }

    /// Check a submitted code's hash against this state.
    ///
    /// Expiry and the attempt cap are checked before the hash so a burned
    /// code never reports a match.
    ///
    /// # Errors
    ///
    /// Returns the first reason the code is not accepted.
    pub fn check(&self, submitted_hash: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        if now >= self.expires_at {
            return Err(OtpError::Expired);
        }
        if self.attempts >= OTP_MAX_ATTEMPTS {
            return Err(OtpError::TooManyAttempts);
        }
        if self.code_hash != submitted_hash {
            return Err(OtpError::Mismatch);
        }
        Ok(())
    }

    /// Whether another code may be sent at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::ResendTooSoon`] inside the cooldown window.
    pub fn check_resend(&self, now: DateTime<Utc>) -> Result<(), OtpError> {
        let elapsed = (now - self.created_at).num_seconds();
        if elapsed < OTP_RESEND_COOLDOWN_SECS {
            return Err(OtpError::ResendTooSoon {
                retry_after_secs: OTP_RESEND_COOLDOWN_SECS - elapsed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(OtpCode::parse(" 123456 ").map(|c| c.as_str().to_owned()), Ok("123456".to_owned()));
        assert_eq!(OtpCode::parse("12345"), Err(OtpError::Malformed));
        assert_eq!(OtpCode::parse("12a456"), Err(OtpError::Malformed));
        assert_eq!(OtpCode::parse("1234567"), Err(OtpError::Malformed));
    }

    #[test]
    fn test_from_number_pads() {
        assert_eq!(OtpCode::from_number(42).as_str(), "000042");
        assert_eq!(OtpCode::from_number(654_321).as_str(), "654321");
    }

    #[test]
    fn test_debug_is_redacted() {
        let code = OtpCode::from_number(111_111);
        assert!(!format!("{code:?}").contains("111111"));
    }

    #[test]
    fn test_check_accepts_matching_code() {
        let state = OtpState::issue("abc".to_owned(), now());
        assert_eq!(state.check("abc", now() + Duration::minutes(9)), Ok(()));
    }

    #[test]
    fn test_check_rejects_mismatch() {
        let state = OtpState::issue("abc".to_owned(), now());
        assert_eq!(state.check("xyz", now()), Err(OtpError::Mismatch));
    }

    #[test]
    fn test_check_expired() {
        let state = OtpState::issue("abc".to_owned(), now());
        assert_eq!(
            state.check("abc", now() + Duration::minutes(10)),
            Err(OtpError::Expired)
        );
    }

    #[test]
    fn test_check_attempts_exhausted() {
        let mut state = OtpState::issue("abc".to_owned(), now());
        state.attempts = OTP_MAX_ATTEMPTS;
        assert_eq!(state.check("abc", now()), Err(OtpError::TooManyAttempts));
    }

    #[test]
    fn test_resend_cooldown() {
        let state = OtpState::issue("abc".to_owned(), now());
        assert_eq!(
            state.check_resend(now() + Duration::seconds(20)),
            Err(OtpError::ResendTooSoon {
                retry_after_secs: 40
            })
        );
        assert_eq!(state.check_resend(now() + Duration::seconds(60)), Ok(()));
    }
}
