//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL of the storefront API
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` - OTP email delivery
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHIPPING_FLAT_RATE` - Shipping cost added to every order, in rupiah (default: 15000)
//! - `SMTP_PORT` - SMTP submission port (default: 587)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use bloom_bouquet_core::Money;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SHIPPING_FLAT_RATE: &str = "15000";

/// Substrings that mark a secret as a copy-pasted placeholder.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    pub session_secret: SecretString,
    /// Flat shipping cost charged at checkout
    pub shipping_flat_rate: Money,
    pub email: EmailConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// SMTP settings for OTP mail.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// From header, e.g. `Bloom Bouquet <no-reply@bloombouquet.id>`
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host: IpAddr = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port: u16 = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let session_secret = SecretString::from(get_required_env("STOREFRONT_SESSION_SECRET")?);
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let shipping_flat_rate = parse_shipping_rate(
            &std::env::var("SHIPPING_FLAT_RATE")
                .unwrap_or_else(|_| DEFAULT_SHIPPING_FLAT_RATE.to_string()),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            shipping_flat_rate,
            email: EmailConfig::from_env()?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Session cookies carry `Secure` when served over HTTPS.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp_host: get_required_env("SMTP_HOST")?,
            smtp_port: parse_env("SMTP_PORT", "587")?,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("SMTP_FROM")?,
        })
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse `key`, or `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn parse_shipping_rate(raw: &str) -> Result<Money, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("SHIPPING_FLAT_RATE".to_string(), reason);
    let amount = Decimal::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if amount.is_sign_negative() {
        return Err(invalid("must not be negative".to_string()));
    }
    Ok(Money::new(amount))
}

/// Length, placeholder and entropy checks for the session secret.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    let insecure = |reason: String| ConfigError::InsecureSecret(var_name.to_string(), reason);

    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(insecure(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
            value.len()
        )));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{pattern}')"
        )));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        )));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_secret_checks() {
        let ok = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6d");
        assert!(validate_session_secret(&ok, "S").is_ok());

        let short = SecretString::from("aB3$xY9!");
        assert!(validate_session_secret(&short, "S").is_err());

        let placeholder = SecretString::from("changeme-changeme-changeme-changeme");
        assert!(matches!(
            validate_session_secret(&placeholder, "S"),
            Err(ConfigError::InsecureSecret(_, _))
        ));

        let flat = SecretString::from("ab".repeat(20));
        assert!(validate_session_secret(&flat, "S").is_err());
    }

    #[test]
    fn test_shipping_rate() {
        assert_eq!(parse_shipping_rate("15000").unwrap(), Money::from_rupiah(15_000));
        assert_eq!(parse_shipping_rate(" 0 ").unwrap(), Money::ZERO);
        assert!(parse_shipping_rate("-1").is_err());
        assert!(parse_shipping_rate("free").is_err());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.mailgun.org".to_string(),
            smtp_port: 587,
            smtp_username: "postmaster".to_string(),
            smtp_password: SecretString::from("hunter2-but-longer"),
            from_address: "Bloom Bouquet <no-reply@bloombouquet.id>".to_string(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("smtp.mailgun.org"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }
}
