//! Registration endpoints: OTP issuance and verification.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use domain::models::{CreatedUser, RegistrationData};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_account_created, record_otp_issued, record_otp_rejected, record_otp_verified,
};
use crate::services::RegistrationError;

/// Request body for `POST /api/auth/send-otp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub email: String,
    pub user_data: RegistrationData,
}

/// Response body for a successful OTP issuance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    /// Issuance requests left in the current rate-limit window.
    pub remaining_attempts: u32,
}

/// Request body for `POST /api/auth/verify-otp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp_code: String,
}

/// Response body for a successful verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub user: CreatedUser,
}

/// `POST /api/auth/send-otp`
///
/// Validates the registration request, issues a verification code, and
/// emails it to the given address.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    let issued = state
        .registration
        .send_otp(&request.email, &request.user_data)
        .await
        .map_err(map_registration_error)?;

    record_otp_issued();

    Ok(Json(SendOtpResponse {
        success: true,
        message: "Verification code sent. Please check your email.".to_string(),
        email: issued.email,
        expires_at: issued.expires_at,
        remaining_attempts: issued.remaining_sends,
    }))
}

/// `POST /api/auth/verify-otp`
///
/// Checks the submitted code against the pending registration and creates
/// the account when it matches.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let user = state
        .registration
        .verify_otp(&request.email, &request.otp_code)
        .await
        .map_err(|e| {
            match &e {
                RegistrationError::NotFoundOrExpired => record_otp_rejected("not_found_or_expired"),
                RegistrationError::AttemptsExhausted => record_otp_rejected("attempts_exhausted"),
                RegistrationError::IncorrectCode { .. } => record_otp_rejected("incorrect_code"),
                _ => {}
            }
            map_registration_error(e)
        })?;

    record_otp_verified();
    record_account_created();

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: "Email verified and account created.".to_string(),
        user,
    }))
}

/// Maps workflow errors onto the API error taxonomy.
fn map_registration_error(err: RegistrationError) -> ApiError {
    match err {
        RegistrationError::InvalidEmail
        | RegistrationError::InvalidUserData(_)
        | RegistrationError::InvalidOtpFormat => ApiError::Validation(err.to_string()),
        RegistrationError::RateLimited { reset_time } => ApiError::RateLimited { reset_time },
        RegistrationError::AccountExists => ApiError::Conflict(err.to_string()),
        RegistrationError::NotFoundOrExpired => ApiError::OtpNotFoundOrExpired,
        RegistrationError::AttemptsExhausted => ApiError::OtpAttemptsExhausted,
        RegistrationError::IncorrectCode { remaining } => {
            ApiError::OtpIncorrectCode { remaining }
        }
        RegistrationError::Delivery(e) => ApiError::Delivery(e.to_string()),
        RegistrationError::AccountCreation(msg) => ApiError::AccountCreation(msg),
        RegistrationError::Password(e) => ApiError::Internal(e.to_string()),
        RegistrationError::Database(e) => e.into(),
        RegistrationError::Internal(msg) => ApiError::Internal(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_send_otp_request_deserialization() {
        let json = r#"{
            "email": "owner@example.com",
            "userData": {
                "fullName": "Sam Rivera",
                "password": "hunter2hunter2",
                "phone": "+421 900 123 456"
            }
        }"#;
        let request: SendOtpRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "owner@example.com");
        assert_eq!(request.user_data.full_name, "Sam Rivera");
        assert_eq!(request.user_data.phone.as_deref(), Some("+421 900 123 456"));
        assert!(request.user_data.address.is_none());
    }

    #[test]
    fn test_verify_otp_request_deserialization() {
        let json = r#"{"email": "owner@example.com", "otpCode": "123456"}"#;
        let request: VerifyOtpRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "owner@example.com");
        assert_eq!(request.otp_code, "123456");
    }

    #[test]
    fn test_send_otp_response_serialization() {
        let response = SendOtpResponse {
            success: true,
            message: "Verification code sent. Please check your email.".to_string(),
            email: "owner@example.com".to_string(),
            expires_at: Utc::now(),
            remaining_attempts: 2,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"expiresAt\""));
        assert!(json.contains("\"remainingAttempts\":2"));
    }

    #[test]
    fn test_map_rate_limited_error() {
        let reset_time = Utc::now();
        let mapped = map_registration_error(RegistrationError::RateLimited { reset_time });
        assert!(matches!(mapped, ApiError::RateLimited { reset_time: t } if t == reset_time));
    }

    #[test]
    fn test_map_incorrect_code_keeps_remaining() {
        let mapped = map_registration_error(RegistrationError::IncorrectCode { remaining: 1 });
        assert!(matches!(mapped, ApiError::OtpIncorrectCode { remaining: 1 }));
    }

    #[test]
    fn test_map_account_exists_to_conflict() {
        let mapped = map_registration_error(RegistrationError::AccountExists);
        assert!(matches!(mapped, ApiError::Conflict(_)));
    }

    #[test]
    fn test_map_validation_errors() {
        assert!(matches!(
            map_registration_error(RegistrationError::InvalidEmail),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            map_registration_error(RegistrationError::InvalidOtpFormat),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_map_stale_code_errors() {
        assert!(matches!(
            map_registration_error(RegistrationError::NotFoundOrExpired),
            ApiError::OtpNotFoundOrExpired
        ));
        assert!(matches!(
            map_registration_error(RegistrationError::AttemptsExhausted),
            ApiError::OtpAttemptsExhausted
        ));
    }
}
