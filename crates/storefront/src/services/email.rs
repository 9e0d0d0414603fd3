//! Transactional email over SMTP.
//!
//! Messages are multipart (plain text + HTML), both rendered from Askama
//! templates under `templates/email/`.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rand::Rng;
use secrecy::ExposeSecret;
use thiserror::Error;

use bloom_bouquet_core::OtpCode;
use bloom_bouquet_core::types::otp::OTP_TTL_MINUTES;

use crate::config::EmailConfig;

#[derive(Template)]
#[template(path = "email/otp.html")]
struct OtpEmailHtml<'a> {
    name: &'a str,
    code: &'a str,
    ttl_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/otp.txt")]
struct OtpEmailText<'a> {
    name: &'a str,
    code: &'a str,
    ttl_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// SMTP mailer shared through `AppState`.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    /// Build the STARTTLS transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the relay host or the From address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let from = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        Ok(Self { mailer, from })
    }

    /// Send a registration verification code.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render or delivery fails.
    pub async fn send_otp(&self, to: &str, name: &str, code: &OtpCode) -> Result<(), EmailError> {
        let html = OtpEmailHtml {
            name,
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()?;
        let text = OtpEmailText {
            name,
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()?;

        self.send_multipart(to, "Your Bloom Bouquet verification code", &text, &html)
            .await
    }

    async fn send_multipart(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;
        tracing::info!(subject = %subject, "Email sent");
        Ok(())
    }
}

/// A fresh six digit code.
#[must_use]
pub fn generate_otp() -> OtpCode {
    OtpCode::from_number(rand::rng().random_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_otp_templates_render_code() {
        let html = OtpEmailHtml {
            name: "Rina",
            code: "482913",
            ttl_minutes: 10,
        }
        .render()
        .expect("html");
        assert!(html.contains("482913"));
        assert!(html.contains("Hi Rina"));

        let text = OtpEmailText {
            name: "Rina",
            code: "482913",
            ttl_minutes: 10,
        }
        .render()
        .expect("text");
        assert!(text.contains("10 minutes"));
    }
}
