use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// API-boundary error taxonomy. Every internal failure is converted into one
/// of these before leaving a handler; raw errors never cross the boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account already exists for the email. Returned as 400, not 409: the
    /// registration endpoints treat it as a caller-fixable request error.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited { reset_time: DateTime<Utc> },

    /// No live OTP record, or it expired. One generic message for both so
    /// callers cannot probe which emails have pending registrations.
    #[error("Invalid or expired verification code")]
    OtpNotFoundOrExpired,

    #[error("Too many verification attempts")]
    OtpAttemptsExhausted,

    #[error("Incorrect verification code, {remaining} attempts remaining")]
    OtpIncorrectCode { remaining: i32 },

    #[error("Email delivery failed")]
    Delivery(String),

    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_attempts: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_time: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, remaining_attempts, reset_time) = match &self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
                None,
            ),
            ApiError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, "conflict", msg.clone(), None, None)
            }
            ApiError::RateLimited { reset_time } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many verification requests. Please try again later.".into(),
                None,
                Some(reset_time.to_rfc3339()),
            ),
            ApiError::OtpNotFoundOrExpired => (
                StatusCode::BAD_REQUEST,
                "otp_invalid_or_expired",
                "Verification code is invalid or has expired. Please request a new one.".into(),
                None,
                None,
            ),
            ApiError::OtpAttemptsExhausted => (
                StatusCode::BAD_REQUEST,
                "otp_attempts_exhausted",
                "Too many incorrect attempts. Please request a new verification code.".into(),
                None,
                None,
            ),
            ApiError::OtpIncorrectCode { remaining } => (
                StatusCode::BAD_REQUEST,
                "otp_incorrect_code",
                format!(
                    "Incorrect verification code. {} attempt{} remaining.",
                    remaining,
                    if *remaining == 1 { "" } else { "s" }
                ),
                Some(*remaining),
                None,
            ),
            ApiError::Delivery(msg) => {
                tracing::error!("Email delivery error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "delivery_error",
                    "Failed to send the verification email. Please try again.".into(),
                    None,
                    None,
                )
            }
            ApiError::AccountCreation(msg) => {
                tracing::error!("Account creation error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "account_creation_error",
                    "Failed to create the account. Please try again.".into(),
                    None,
                    None,
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: error_code.into(),
            message,
            remaining_attempts,
            reset_time,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    ApiError::Conflict("Resource already exists".into())
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();

        let message = if messages.len() == 1 {
            messages[0].clone()
        } else {
            format!("{} validation errors", messages.len())
        };

        ApiError::Validation(message)
    }
}
