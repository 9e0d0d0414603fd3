//! Unified error handling for admin.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are sent
//! to Sentry and answered with a generic message; client errors carry a JSON
//! body of the form `{"error": "...", "fields": {...}}`.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use bloom_bouquet_core::TransitionError;

use crate::db::RepositoryError;
use crate::db::orders::StatusChangeError;
use crate::services::auth::AuthError;
use crate::services::order_expiry::SweepError;
use crate::services::uploads::UploadError;

/// Per-field validation messages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` carrying the recorded messages.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Login or password handling failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image upload rejected or failed to store.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Order sweep failed.
    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),

    /// Input failed validation.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// State conflict (duplicate, invalid transition, stock).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<StatusChangeError> for AppError {
    fn from(err: StatusChangeError) -> Self {
        match err {
            StatusChangeError::Repository(e) => Self::Database(e),
            StatusChangeError::Transition(e) => e.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(RepositoryError::NotFound | RepositoryError::Conflict(_)) => false,
            Self::Database(_) | Self::Internal(_) | Self::Sweep(_) => true,
            Self::Auth(err) => matches!(err, AuthError::PasswordHash | AuthError::Repository(_)),
            Self::Upload(err) => matches!(err, UploadError::Io(_)),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Auth(AuthError::InvalidCredentials) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::WeakPassword(_) | AuthError::InvalidEmail(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::AdminExists) => StatusCode::CONFLICT,
            Self::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upload(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Auth(_) | Self::Sweep(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Auth(AuthError::WeakPassword(msg)) => msg.clone(),
            Self::Auth(AuthError::InvalidEmail(_)) => "Invalid email address".to_string(),
            Self::Upload(err) => err.to_string(),
            Self::Validation(_) => "The given data was invalid".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = self.status();
        let message = self.public_message();
        let fields = match &self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };

        (
            status,
            Json(ErrorBody {
                error: &message,
                fields,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin ID.
pub fn set_sentry_user(admin_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 12".to_string());
        assert_eq!(err.to_string(), "Not found: order 12");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("slug".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Validation(FieldErrors::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transition_error_is_conflict() {
        let err: AppError = TransitionError {
            from: "delivered",
            to: "processing",
        }
        .into();
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("connection refused at 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut fields = FieldErrors::new();
        fields.add("name", "required");
        fields.add("name", "too long");
        assert_eq!(fields.get("name"), Some("required"));
        assert!(fields.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
