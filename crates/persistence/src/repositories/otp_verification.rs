//! Repository for OTP verification record operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::OtpVerificationEntity;

/// Repository for OTP verification records.
#[derive(Clone)]
pub struct OtpVerificationRepository {
    pool: PgPool,
}

impl OtpVerificationRepository {
    /// Creates a new OTP verification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a fresh OTP record with `attempts = 0, is_verified = false`.
    pub async fn create(
        &self,
        email: &str,
        otp_code: &str,
        verification_data: &serde_json::Value,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpVerificationEntity, sqlx::Error> {
        sqlx::query_as::<_, OtpVerificationEntity>(
            r#"
            INSERT INTO otp_verifications (email, otp_code, verification_data, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, otp_code, verification_data, attempts, is_verified,
                      expires_at, created_at
            "#,
        )
        .bind(email)
        .bind(otp_code)
        .bind(verification_data)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Finds the most recently created unverified record for an email.
    ///
    /// Cleanup-on-issuance should leave at most one, but when duplicates
    /// exist the most recent `created_at` wins.
    pub async fn find_latest_unverified(
        &self,
        email: &str,
    ) -> Result<Option<OtpVerificationEntity>, sqlx::Error> {
        sqlx::query_as::<_, OtpVerificationEntity>(
            r#"
            SELECT id, email, otp_code, verification_data, attempts, is_verified,
                   expires_at, created_at
            FROM otp_verifications
            WHERE email = $1 AND is_verified = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Deletes every record for an email. Idempotent cleanup before a new
    /// issuance, and rollback after a failed email dispatch.
    ///
    /// Returns the number of deleted records.
    pub async fn delete_for_email(&self, email: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM otp_verifications
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Deletes a single record by id.
    ///
    /// Returns true if a record was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM otp_verifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increments the failed-attempt counter atomically and returns the new
    /// count.
    ///
    /// The increment happens in a single UPDATE so two concurrent wrong-code
    /// submissions cannot both observe the pre-increment value; the bound on
    /// over-limit attempts is exact rather than approximate.
    ///
    /// Returns `None` if the record no longer exists.
    pub async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE otp_verifications
            SET attempts = attempts + 1
            WHERE id = $1
            RETURNING attempts
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(attempts,)| attempts))
    }

    /// Marks a record verified, guarding against double consumption.
    ///
    /// The `AND is_verified = FALSE` predicate makes consumption atomic: a
    /// record that has already produced an account can never be replayed to
    /// create a second one.
    ///
    /// Returns true if this call performed the transition.
    pub async fn mark_verified(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE otp_verifications
            SET is_verified = TRUE
            WHERE id = $1 AND is_verified = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
