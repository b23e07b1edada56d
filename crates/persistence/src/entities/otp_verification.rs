//! OTP verification entity (database row mapping).
//!
//! One row per pending email verification. The issuance workflow deletes
//! prior rows for an email before inserting, so at most one unverified row
//! is live per email; reads still order by `created_at` defensively.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the otp_verifications table.
#[derive(Debug, Clone, FromRow)]
pub struct OtpVerificationEntity {
    pub id: Uuid,
    pub email: String,
    pub otp_code: String,
    /// Pending registrant profile fields, the sole source of truth for the
    /// account created on successful verification.
    pub verification_data: serde_json::Value,
    pub attempts: i32,
    pub is_verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpVerificationEntity {
    /// Check if this record's code has expired.
    pub fn is_expired(&self) -> bool {
        shared::otp::is_otp_expired(self.expires_at)
    }

    /// Check if the attempt budget is used up.
    pub fn attempts_exhausted(&self, max_attempts: i32) -> bool {
        self.attempts >= max_attempts
    }

    /// Attempts left before the record is invalidated.
    pub fn remaining_attempts(&self, max_attempts: i32) -> i32 {
        (max_attempts - self.attempts).max(0)
    }

    /// A live record can still be verified: unverified, unexpired, and
    /// within the attempt budget.
    pub fn is_live(&self, max_attempts: i32) -> bool {
        !self.is_verified && !self.is_expired() && !self.attempts_exhausted(max_attempts)
    }
}
