//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL of the admin API
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `UPLOAD_DIR` - Where product, category and carousel images go (default: storage/uploads)
//! - `ORDER_SWEEP_INTERVAL_SECS` - Expired order sweep period, 0 disables (default: 60)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//! - `ADMIN_TLS_CERT` + `ADMIN_TLS_KEY` - PEM certificate chain and key, set both or neither

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Lowercase fragments that give away a copy-pasted sample secret.
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
    "insert",
    "put-your",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    pub session_secret: SecretString,
    /// Uploaded images live here and are served at `/uploads`
    pub upload_dir: PathBuf,
    /// Period of the expired-order sweeper; `None` when disabled
    pub sweep_interval: Option<Duration>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
    /// Serve HTTPS directly when present
    pub tls: Option<TlsConfig>,
}

/// PEM material for serving HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    pub cert_pem: String,
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// when one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or the session secret looks weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let session_secret = SecretString::from(required("ADMIN_SESSION_SECRET")?);
        check_session_secret(&session_secret, "ADMIN_SESSION_SECRET")?;

        Ok(Self {
            database_url: get_database_url("ADMIN_DATABASE_URL")?,
            host: parse_env("ADMIN_HOST", "127.0.0.1")?,
            port: parse_env("ADMIN_PORT", "3001")?,
            base_url: required("ADMIN_BASE_URL")?,
            session_secret,
            upload_dir: parse_env("UPLOAD_DIR", "storage/uploads")?,
            sweep_interval: sweep_interval(parse_env("ORDER_SWEEP_INTERVAL_SECS", "60")?),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
            tls: tls_from_parts(
                std::env::var("ADMIN_TLS_CERT").ok(),
                std::env::var("ADMIN_TLS_KEY").ok(),
            )?,
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
        self.tls.is_some() || self.base_url.starts_with("https://")
    }
}

/// Database URL from `primary_key`, else the shared `DATABASE_URL`.
///
/// The CLI uses this too since it works on the admin database.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` naming `primary_key` when neither is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

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

const fn sweep_interval(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

fn tls_from_parts(cert: Option<String>, key: Option<String>) -> Result<Option<TlsConfig>, ConfigError> {
    match (cert, key) {
        (Some(cert_pem), Some(key)) => Ok(Some(TlsConfig {
            cert_pem,
            key_pem: SecretString::from(key),
        })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::InvalidEnvVar(
            "ADMIN_TLS_*".to_string(),
            "ADMIN_TLS_CERT and ADMIN_TLS_KEY must be set together".to_string(),
        )),
    }
}

fn check_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
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

    let bits = entropy_per_char(value);
    if bits < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "entropy too low ({bits:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
        )));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
fn entropy_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/bloom_bouquet"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            upload_dir: PathBuf::from("storage/uploads"),
            sweep_interval: Some(Duration::from_secs(60)),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            tls: None,
        }
    }

    #[test]
    fn test_entropy_per_char() {
        assert!(entropy_per_char("").abs() < f64::EPSILON);
        assert!(entropy_per_char("mmmmmm").abs() < f64::EPSILON);
        assert!((entropy_per_char("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_session_secret_checks() {
        let ok = SecretString::from("Qm7#vR2!kP9@wX4$zL8&nB3*tF6^hJ1d");
        assert!(check_session_secret(&ok, "S").is_ok());

        let short = SecretString::from("Qm7#vR2!");
        assert!(check_session_secret(&short, "S").is_err());

        let placeholder = SecretString::from("put-your-admin-session-key-here-0123");
        assert!(matches!(
            check_session_secret(&placeholder, "S"),
            Err(ConfigError::InsecureSecret(_, _))
        ));

        let flat = SecretString::from("ab".repeat(20));
        assert!(check_session_secret(&flat, "S").is_err());
    }

    #[test]
    fn test_sweep_interval() {
        assert_eq!(sweep_interval(60), Some(Duration::from_secs(60)));
        assert_eq!(sweep_interval(0), None);
    }

    #[test]
    fn test_tls_needs_both_parts() {
        assert!(tls_from_parts(None, None).unwrap().is_none());
        assert!(
            tls_from_parts(Some("cert".to_string()), Some("key".to_string()))
                .unwrap()
                .is_some()
        );
        assert!(tls_from_parts(Some("cert".to_string()), None).is_err());
        assert!(tls_from_parts(None, Some("key".to_string())).is_err());
    }

    #[test]
    fn test_secure_cookies() {
        let mut cfg = config();
        assert!(!cfg.secure_cookies());
        assert_eq!(cfg.socket_addr().port(), 3001);
        cfg.base_url = "https://admin.bloombouquet.id".to_string();
        assert!(cfg.secure_cookies());
    }

    #[test]
    fn test_tls_debug_redacts_key() {
        let tls = TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("very_private_key_material"),
        };
        let debug = format!("{tls:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very_private_key_material"));
    }
}
