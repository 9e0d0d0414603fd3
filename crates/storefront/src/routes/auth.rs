//! Customer registration, email verification, login and logout.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use bloom_bouquet_core::types::otp::OTP_TTL_MINUTES;

use super::session_error;
use crate::db::UserRepository;
use crate::error::{AppError, FieldErrors, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::User;
use crate::models::user::{MAX_FIELD_LENGTH, is_phone_char};
use crate::services::AuthService;
use crate::services::auth::Registration;
use crate::state::AppState;

/// Routes mounted under `/api/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "The name field is required.");
        errors.require("email", &self.email, "The email field is required.");
        errors.require("password", &self.password, "The password field is required.");
        if self.name.chars().count() > MAX_FIELD_LENGTH {
            errors.add("name", "The name may not be greater than 255 characters.");
        }
        if let Some(phone) = self.phone.as_deref()
            && !phone.chars().all(is_phone_char)
        {
            errors.add("phone", "The phone format is invalid.");
        }
        if self.password != self.password_confirmation {
            errors.add("password", "The password confirmation does not match.");
        }
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Answer to `register` and `resend-otp`: where the code went and for how long.
#[derive(Debug, Serialize)]
pub struct CodeSent {
    pub message: &'static str,
    pub email: String,
    pub expires_in_minutes: i64,
}

impl CodeSent {
    fn to(email: String) -> Self {
        Self {
            message: "A verification code has been sent to your email",
            email,
            expires_in_minutes: OTP_TTL_MINUTES,
        }
    }
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CodeSent>)> {
    body.validate().into_result()?;

    let user = AuthService::new(state.pool(), state.mailer())
        .register(
            &Registration {
                name: &body.name,
                email: &body.email,
                phone: body.phone.as_deref(),
                password: &body.password,
            },
            Utc::now(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CodeSent::to(user.email.into_inner())),
    ))
}

/// Verify the emailed code and start a session.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool(), state.mailer())
        .verify_otp(&body.email, &body.code, Utc::now())
        .await?;

    set_current_user(&session, &user.to_current())
        .await
        .map_err(session_error)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(Json(user))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<CodeSent>> {
    AuthService::new(state.pool(), state.mailer())
        .resend_otp(&body.email, Utc::now())
        .await?;
    Ok(Json(CodeSent::to(body.email.trim().to_lowercase())))
}

#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool(), state.mailer())
        .login(&body.email, &body.password)
        .await
        .inspect_err(|_| tracing::info!("Failed customer login"))?;

    set_current_user(&session, &user.to_current())
        .await
        .map_err(session_error)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "Customer logged in");
    Ok(Json(user))
}

pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await.map_err(session_error)?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in customer, re-read from the database.
pub async fn me(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get(current.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: "Sari Wulandari".to_string(),
            email: "sari@example.com".to_string(),
            phone: Some("+62 812-3456-7890".to_string()),
            password: "anggrek-bulan".to_string(),
            password_confirmation: "anggrek-bulan".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(request().validate().is_empty());
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let mut req = request();
        req.password_confirmation = "anggrek".to_string();
        assert_eq!(
            req.validate().get("password"),
            Some("The password confirmation does not match.")
        );
    }

    #[test]
    fn test_phone_format() {
        let mut req = request();
        req.phone = Some("call me".to_string());
        assert!(req.validate().get("phone").is_some());
    }
}
