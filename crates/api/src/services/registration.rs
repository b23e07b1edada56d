//! Registration service: OTP issuance and verification workflows.
//!
//! Issuance turns a registration request into a persisted OTP record and an
//! outbound email; verification consumes a submitted code and promotes the
//! pending registration into a real account. Each request runs the steps
//! sequentially; the only shared state is the OTP table and the in-process
//! send limiter.
//!
//! The service reaches storage through the [`OtpStore`] and [`ProfileStore`]
//! traits, implemented by the Postgres repositories in production and by
//! in-memory doubles in the tests below.

use chrono::{DateTime, Utc};
use domain::models::{CreatedUser, RegistrationData};
use persistence::entities::{OtpVerificationEntity, ProfileEntity};
use persistence::repositories::{CreateProfileError, OtpVerificationRepository, ProfileRepository};
use shared::otp::{generate_otp, is_valid_otp_format, otp_expiration, sanitize_otp};
use shared::password::{hash_password, PasswordError};
use shared::validation::normalize_email;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::config::OtpConfig;
use crate::services::email::{EmailError, EmailService};
use crate::services::rate_limit::SendRateLimiter;

/// Errors from the registration workflows.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("A valid email address is required")]
    InvalidEmail,

    #[error("User data is required: {0}")]
    InvalidUserData(String),

    #[error("Verification code must be 6 digits")]
    InvalidOtpFormat,

    #[error("Too many verification requests")]
    RateLimited { reset_time: DateTime<Utc> },

    #[error("An account with this email already exists")]
    AccountExists,

    #[error("Verification code is invalid or has expired")]
    NotFoundOrExpired,

    #[error("Too many incorrect attempts")]
    AttemptsExhausted,

    #[error("Incorrect verification code")]
    IncorrectCode { remaining: i32 },

    #[error("Email delivery failed: {0}")]
    Delivery(#[from] EmailError),

    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage operations the workflows need for OTP verification records.
#[async_trait::async_trait]
pub trait OtpStore: Send + Sync {
    async fn create(
        &self,
        email: &str,
        otp_code: &str,
        verification_data: &serde_json::Value,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpVerificationEntity, sqlx::Error>;

    async fn find_latest_unverified(
        &self,
        email: &str,
    ) -> Result<Option<OtpVerificationEntity>, sqlx::Error>;

    async fn delete_for_email(&self, email: &str) -> Result<u64, sqlx::Error>;

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, sqlx::Error>;

    async fn mark_verified(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait::async_trait]
impl OtpStore for OtpVerificationRepository {
    async fn create(
        &self,
        email: &str,
        otp_code: &str,
        verification_data: &serde_json::Value,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpVerificationEntity, sqlx::Error> {
        OtpVerificationRepository::create(self, email, otp_code, verification_data, expires_at)
            .await
    }

    async fn find_latest_unverified(
        &self,
        email: &str,
    ) -> Result<Option<OtpVerificationEntity>, sqlx::Error> {
        OtpVerificationRepository::find_latest_unverified(self, email).await
    }

    async fn delete_for_email(&self, email: &str) -> Result<u64, sqlx::Error> {
        OtpVerificationRepository::delete_for_email(self, email).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        OtpVerificationRepository::delete(self, id).await
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        OtpVerificationRepository::increment_attempts(self, id).await
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        OtpVerificationRepository::mark_verified(self, id).await
    }
}

/// Storage operations the workflows need for account profiles.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error>;

    async fn create_registrant(
        &self,
        email: &str,
        password_hash: &str,
        data: &RegistrationData,
    ) -> Result<ProfileEntity, CreateProfileError>;
}

#[async_trait::async_trait]
impl ProfileStore for ProfileRepository {
    async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        ProfileRepository::email_exists(self, email).await
    }

    async fn create_registrant(
        &self,
        email: &str,
        password_hash: &str,
        data: &RegistrationData,
    ) -> Result<ProfileEntity, CreateProfileError> {
        ProfileRepository::create_registrant(self, email, password_hash, data).await
    }
}

/// Result of a successful OTP issuance.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub email: String,
    pub expires_at: DateTime<Utc>,
    /// Issuance requests left in the current rate-limit window.
    pub remaining_sends: u32,
}

/// Registration service wiring the OTP store, profile store, email
/// transport, and send limiter together.
#[derive(Clone)]
pub struct RegistrationService<O = OtpVerificationRepository, P = ProfileRepository> {
    otp_repo: O,
    profile_repo: P,
    email_service: EmailService,
    rate_limiter: Arc<SendRateLimiter>,
    otp_config: OtpConfig,
}

impl RegistrationService {
    /// Creates a registration service backed by the Postgres repositories.
    pub fn new(
        pool: PgPool,
        email_service: EmailService,
        rate_limiter: Arc<SendRateLimiter>,
        otp_config: OtpConfig,
    ) -> Self {
        Self {
            otp_repo: OtpVerificationRepository::new(pool.clone()),
            profile_repo: ProfileRepository::new(pool),
            email_service,
            rate_limiter,
            otp_config,
        }
    }
}

impl<O: OtpStore, P: ProfileStore> RegistrationService<O, P> {
    /// Issues a fresh OTP for a pending registration and emails it.
    ///
    /// Checks run in order and short-circuit: email syntax, payload
    /// validity, send rate limit, no existing account. On success any prior
    /// OTP rows for the email are removed before the new row is inserted,
    /// keeping one live record per address. If the email cannot be
    /// delivered the new row is rolled back so no valid code exists that
    /// nobody received.
    pub async fn send_otp(
        &self,
        email: &str,
        data: &RegistrationData,
    ) -> Result<IssuedOtp, RegistrationError> {
        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(RegistrationError::InvalidEmail);
        }

        data.validate()
            .map_err(|e| RegistrationError::InvalidUserData(flatten_validation_errors(&e)))?;

        let decision = self.rate_limiter.check(&email);
        if !decision.allowed {
            return Err(RegistrationError::RateLimited {
                reset_time: decision.reset_time,
            });
        }

        if self.profile_repo.email_exists(&email).await? {
            return Err(RegistrationError::AccountExists);
        }

        let otp_code = generate_otp();
        let expires_at = otp_expiration(self.otp_config.expiry_minutes);
        let verification_data = serde_json::to_value(data)
            .map_err(|e| RegistrationError::Internal(format!("Payload serialization: {}", e)))?;

        let removed = self.otp_repo.delete_for_email(&email).await?;
        if removed > 0 {
            info!(email = %email, removed, "Replaced existing OTP record(s)");
        }

        let record = self
            .otp_repo
            .create(&email, &otp_code, &verification_data, expires_at)
            .await?;

        if let Err(e) = self
            .email_service
            .send_otp_email(
                &email,
                Some(data.full_name.trim()),
                &otp_code,
                self.otp_config.expiry_minutes,
            )
            .await
        {
            // Roll back: a code nobody received must not stay redeemable.
            if let Err(del_err) = self.otp_repo.delete(record.id).await {
                warn!(email = %email, error = %del_err, "Failed to roll back OTP record after delivery failure");
            }
            return Err(RegistrationError::Delivery(e));
        }

        info!(email = %email, expires_at = %expires_at, "OTP issued");

        Ok(IssuedOtp {
            email,
            expires_at,
            remaining_sends: decision.remaining_attempts,
        })
    }

    /// Verifies a submitted code and, on success, creates the account from
    /// the stored registration payload.
    ///
    /// Expired or attempt-exhausted records are deleted on the spot and
    /// reported with the same generic error as a missing record. Wrong
    /// codes increment the attempt counter atomically in the store, so the
    /// 3-attempt bound holds even under concurrent submissions.
    ///
    /// If account creation fails after a correct match, the OTP record is
    /// left unverified and live: the user may retry verification with the
    /// same code, and the unique email constraint prevents double creation.
    pub async fn verify_otp(
        &self,
        email: &str,
        raw_code: &str,
    ) -> Result<CreatedUser, RegistrationError> {
        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(RegistrationError::InvalidEmail);
        }

        let code = sanitize_otp(raw_code);
        if !is_valid_otp_format(&code) {
            return Err(RegistrationError::InvalidOtpFormat);
        }

        let max_attempts = self.otp_config.max_verify_attempts;

        let record = match self.otp_repo.find_latest_unverified(&email).await? {
            Some(record) => record,
            None => return Err(RegistrationError::NotFoundOrExpired),
        };

        if record.is_expired() {
            self.otp_repo.delete(record.id).await?;
            return Err(RegistrationError::NotFoundOrExpired);
        }

        if record.attempts_exhausted(max_attempts) {
            self.otp_repo.delete(record.id).await?;
            return Err(RegistrationError::AttemptsExhausted);
        }

        if record.otp_code != code {
            let attempts = match self.otp_repo.increment_attempts(record.id).await? {
                Some(attempts) => attempts,
                // Record vanished between read and update; treat as stale.
                None => return Err(RegistrationError::NotFoundOrExpired),
            };
            let remaining = (max_attempts - attempts).max(0);
            if remaining == 0 {
                self.otp_repo.delete(record.id).await?;
            }
            return Err(RegistrationError::IncorrectCode { remaining });
        }

        let data: RegistrationData = serde_json::from_value(record.verification_data.clone())
            .map_err(|e| {
                RegistrationError::Internal(format!("Corrupt verification payload: {}", e))
            })?;

        let password_hash = hash_password(&data.password)?;

        let profile = match self
            .profile_repo
            .create_registrant(&email, &password_hash, &data)
            .await
        {
            Ok(profile) => profile,
            Err(CreateProfileError::AlreadyExists) => {
                // The code was already redeemed (or the email signed up
                // through a race). Never reuse a record to mint a second
                // account.
                return Err(RegistrationError::AccountExists);
            }
            Err(CreateProfileError::Database(e)) => {
                return Err(RegistrationError::AccountCreation(e.to_string()));
            }
        };

        if !self.otp_repo.mark_verified(record.id).await? {
            warn!(email = %email, "OTP record was already consumed");
        }

        info!(email = %email, user_id = %profile.id, role = %profile.user_role, "Account created from verified registration");

        Ok(CreatedUser {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            user_role: profile.user_role.parse().unwrap_or_default(),
            created_at: Some(profile.created_at),
        })
    }
}

/// Collapses validator errors into one human-readable message.
fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })
        })
        .collect();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;
    use chrono::Duration;
    use domain::models::UserRole;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeOtpStore {
        rows: Mutex<Vec<OtpVerificationEntity>>,
    }

    impl FakeOtpStore {
        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn live_code(&self, email: &str) -> Option<String> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.email == email && !r.is_verified)
                .max_by_key(|r| r.created_at)
                .map(|r| r.otp_code.clone())
        }

        fn seed(&self, row: OtpVerificationEntity) {
            self.rows.lock().unwrap().push(row);
        }
    }

    #[async_trait::async_trait]
    impl OtpStore for FakeOtpStore {
        async fn create(
            &self,
            email: &str,
            otp_code: &str,
            verification_data: &serde_json::Value,
            expires_at: DateTime<Utc>,
        ) -> Result<OtpVerificationEntity, sqlx::Error> {
            let row = OtpVerificationEntity {
                id: Uuid::new_v4(),
                email: email.to_string(),
                otp_code: otp_code.to_string(),
                verification_data: verification_data.clone(),
                attempts: 0,
                is_verified: false,
                expires_at,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn find_latest_unverified(
            &self,
            email: &str,
        ) -> Result<Option<OtpVerificationEntity>, sqlx::Error> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.email == email && !r.is_verified)
                .max_by_key(|r| r.created_at)
                .cloned())
        }

        async fn delete_for_email(&self, email: &str) -> Result<u64, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.email != email);
            Ok((before - rows.len()) as u64)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() < before)
        }

        async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
                r.attempts += 1;
                r.attempts
            }))
        }

        async fn mark_verified(&self, id: Uuid) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|r| r.id == id && !r.is_verified) {
                Some(row) => {
                    row.is_verified = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct FakeProfileStore {
        emails: Mutex<HashSet<String>>,
        fail_creation: AtomicBool,
    }

    #[async_trait::async_trait]
    impl ProfileStore for FakeProfileStore {
        async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
            Ok(self.emails.lock().unwrap().contains(email))
        }

        async fn create_registrant(
            &self,
            email: &str,
            password_hash: &str,
            data: &RegistrationData,
        ) -> Result<ProfileEntity, CreateProfileError> {
            if self.fail_creation.load(Ordering::SeqCst) {
                return Err(CreateProfileError::Database(sqlx::Error::PoolClosed));
            }
            let mut emails = self.emails.lock().unwrap();
            if !emails.insert(email.to_string()) {
                return Err(CreateProfileError::AlreadyExists);
            }
            let now = Utc::now();
            Ok(ProfileEntity {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                full_name: data.full_name.trim().to_string(),
                phone: data.phone.clone(),
                address: data.address.clone(),
                user_role: data.role().as_str().to_string(),
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn in_memory_service() -> RegistrationService<FakeOtpStore, FakeProfileStore> {
        service_with_email(EmailConfig::default())
    }

    fn service_with_email(
        email_config: EmailConfig,
    ) -> RegistrationService<FakeOtpStore, FakeProfileStore> {
        RegistrationService {
            otp_repo: FakeOtpStore::default(),
            profile_repo: FakeProfileStore::default(),
            email_service: EmailService::new(email_config),
            rate_limiter: Arc::new(SendRateLimiter::new(3, 3600)),
            otp_config: OtpConfig::default(),
        }
    }

    fn valid_data() -> RegistrationData {
        RegistrationData {
            full_name: "Sam Rivera".to_string(),
            password: "hunter2hunter2".to_string(),
            phone: None,
            address: None,
            user_role: None,
        }
    }

    fn wrong_code(actual: &str) -> String {
        if actual == "000000" {
            "000001".to_string()
        } else {
            "000000".to_string()
        }
    }

    fn expired_record(email: &str, code: &str) -> OtpVerificationEntity {
        OtpVerificationEntity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            otp_code: code.to_string(),
            verification_data: serde_json::to_value(valid_data()).unwrap(),
            attempts: 0,
            is_verified: false,
            expires_at: Utc::now() - Duration::minutes(1),
            created_at: Utc::now() - Duration::minutes(11),
        }
    }

    #[tokio::test]
    async fn test_send_otp_persists_one_live_record() {
        let svc = in_memory_service();

        let issued = svc.send_otp("owner@example.com", &valid_data()).await.unwrap();

        assert_eq!(issued.email, "owner@example.com");
        assert_eq!(issued.remaining_sends, 2);
        assert_eq!(svc.otp_repo.row_count(), 1);
        let code = svc.otp_repo.live_code("owner@example.com").unwrap();
        assert!(is_valid_otp_format(&code));
    }

    #[tokio::test]
    async fn test_send_otp_replaces_prior_record() {
        let svc = in_memory_service();

        svc.send_otp("owner@example.com", &valid_data()).await.unwrap();
        let issued = svc.send_otp("owner@example.com", &valid_data()).await.unwrap();

        assert_eq!(issued.remaining_sends, 1);
        assert_eq!(svc.otp_repo.row_count(), 1);
    }

    #[tokio::test]
    async fn test_send_otp_rejects_existing_account() {
        let svc = in_memory_service();
        svc.profile_repo
            .emails
            .lock()
            .unwrap()
            .insert("owner@example.com".to_string());

        let err = svc.send_otp("owner@example.com", &valid_data()).await.unwrap_err();

        assert!(matches!(err, RegistrationError::AccountExists));
        assert_eq!(svc.otp_repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_send_otp_rate_limited_after_three() {
        let svc = in_memory_service();

        for _ in 0..3 {
            svc.send_otp("owner@example.com", &valid_data()).await.unwrap();
        }
        let err = svc.send_otp("owner@example.com", &valid_data()).await.unwrap_err();

        assert!(matches!(err, RegistrationError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_send_otp_delivery_failure_rolls_back_record() {
        let email_config = EmailConfig {
            enabled: true,
            provider: "carrier-pigeon".to_string(),
            ..EmailConfig::default()
        };
        let svc = service_with_email(email_config);

        let err = svc.send_otp("owner@example.com", &valid_data()).await.unwrap_err();

        assert!(matches!(err, RegistrationError::Delivery(_)));
        // The inserted record must not stay redeemable.
        assert_eq!(svc.otp_repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_correct_code_creates_account_once() {
        let svc = in_memory_service();
        svc.send_otp("owner@example.com", &valid_data()).await.unwrap();
        let code = svc.otp_repo.live_code("owner@example.com").unwrap();

        let user = svc.verify_otp("owner@example.com", &code).await.unwrap();
        assert_eq!(user.email, "owner@example.com");
        assert_eq!(user.full_name, "Sam Rivera");
        assert_eq!(user.user_role, UserRole::PetOwner);

        // Replaying the consumed code must not mint a second account.
        let err = svc.verify_otp("owner@example.com", &code).await.unwrap_err();
        assert!(matches!(err, RegistrationError::NotFoundOrExpired));
        assert_eq!(svc.profile_repo.emails.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_wrong_code_counts_down_then_deletes() {
        let svc = in_memory_service();
        svc.send_otp("owner@example.com", &valid_data()).await.unwrap();
        let code = svc.otp_repo.live_code("owner@example.com").unwrap();
        let bad = wrong_code(&code);

        for expected_remaining in [2, 1, 0] {
            let err = svc.verify_otp("owner@example.com", &bad).await.unwrap_err();
            match err {
                RegistrationError::IncorrectCode { remaining } => {
                    assert_eq!(remaining, expected_remaining);
                }
                other => panic!("expected IncorrectCode, got {:?}", other),
            }
        }

        // The third miss deletes the record; even the right code is dead now.
        assert_eq!(svc.otp_repo.row_count(), 0);
        let err = svc.verify_otp("owner@example.com", &code).await.unwrap_err();
        assert!(matches!(err, RegistrationError::NotFoundOrExpired));
        assert!(svc.profile_repo.emails.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_expired_record_deleted_on_touch() {
        let svc = in_memory_service();
        svc.otp_repo.seed(expired_record("owner@example.com", "123456"));

        let err = svc
            .verify_otp("owner@example.com", "123456")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::NotFoundOrExpired));
        assert_eq!(svc.otp_repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_exhausted_record_deleted_on_touch() {
        let svc = in_memory_service();
        let mut record = expired_record("owner@example.com", "123456");
        record.expires_at = Utc::now() + Duration::minutes(10);
        record.attempts = 3;
        svc.otp_repo.seed(record);

        let err = svc
            .verify_otp("owner@example.com", "123456")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::AttemptsExhausted));
        assert_eq!(svc.otp_repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_account_creation_failure_keeps_code_redeemable() {
        let svc = in_memory_service();
        svc.send_otp("owner@example.com", &valid_data()).await.unwrap();
        let code = svc.otp_repo.live_code("owner@example.com").unwrap();

        svc.profile_repo.fail_creation.store(true, Ordering::SeqCst);
        let err = svc.verify_otp("owner@example.com", &code).await.unwrap_err();
        assert!(matches!(err, RegistrationError::AccountCreation(_)));

        // The record stays live, so the same code succeeds once the
        // downstream store recovers.
        assert_eq!(svc.otp_repo.live_code("owner@example.com"), Some(code.clone()));
        svc.profile_repo.fail_creation.store(false, Ordering::SeqCst);
        let user = svc.verify_otp("owner@example.com", &code).await.unwrap();
        assert_eq!(user.email, "owner@example.com");
    }

    #[tokio::test]
    async fn test_verify_blocked_when_account_created_after_issuance() {
        let svc = in_memory_service();
        svc.send_otp("owner@example.com", &valid_data()).await.unwrap();
        let code = svc.otp_repo.live_code("owner@example.com").unwrap();

        // Another path created the account between issuance and verification.
        svc.profile_repo
            .emails
            .lock()
            .unwrap()
            .insert("owner@example.com".to_string());

        let err = svc.verify_otp("owner@example.com", &code).await.unwrap_err();
        assert!(matches!(err, RegistrationError::AccountExists));
        assert_eq!(svc.profile_repo.emails.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_registration_error_display() {
        assert_eq!(
            format!("{}", RegistrationError::InvalidEmail),
            "A valid email address is required"
        );
        assert_eq!(
            format!("{}", RegistrationError::AccountExists),
            "An account with this email already exists"
        );
        assert_eq!(
            format!("{}", RegistrationError::InvalidOtpFormat),
            "Verification code must be 6 digits"
        );
    }

    #[test]
    fn test_flatten_validation_errors_single() {
        let data = RegistrationData {
            full_name: "Owner".to_string(),
            password: "short".to_string(),
            phone: None,
            address: None,
            user_role: None,
        };
        let errors = data.validate().unwrap_err();
        let message = flatten_validation_errors(&errors);
        assert!(message.contains("at least 8 characters"));
    }

    #[test]
    fn test_flatten_validation_errors_multiple() {
        let data = RegistrationData {
            full_name: "".to_string(),
            password: "short".to_string(),
            phone: None,
            address: None,
            user_role: None,
        };
        let errors = data.validate().unwrap_err();
        let message = flatten_validation_errors(&errors);
        assert!(message.contains(';'));
    }

    #[test]
    fn test_issued_otp_fields() {
        let issued = IssuedOtp {
            email: "new@example.com".to_string(),
            expires_at: Utc::now(),
            remaining_sends: 2,
        };
        assert_eq!(issued.remaining_sends, 2);
        assert_eq!(issued.email, "new@example.com");
    }
}
