//! Repository for account profile operations.

use chrono::Utc;
use domain::models::{RegistrationData, UserRole};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::ProfileEntity;

/// Errors from profile creation.
#[derive(Debug, Error)]
pub enum CreateProfileError {
    /// The email already has an account. Covers both the pre-check and the
    /// unique-constraint race when two verifications land together.
    #[error("An account with this email already exists")]
    AlreadyExists,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for account profiles and role-specific sub-profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checks whether an account already exists for the email.
    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(existing.is_some())
    }

    /// Creates the account promoted from a verified registration: the
    /// profile row plus, for pet owners, the pet-owner sub-profile, in one
    /// transaction.
    ///
    /// `password_hash` must already be an Argon2id PHC string; plaintext
    /// never reaches this layer.
    pub async fn create_registrant(
        &self,
        email: &str,
        password_hash: &str,
        data: &RegistrationData,
    ) -> Result<ProfileEntity, CreateProfileError> {
        let role = data.role();
        let profile_id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let insert_result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            INSERT INTO profiles (id, email, password_hash, full_name, phone, address,
                                  user_role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id, email, password_hash, full_name, phone, address, user_role,
                      created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(email)
        .bind(password_hash)
        .bind(data.full_name.trim())
        .bind(data.phone.as_deref())
        .bind(data.address.as_deref())
        .bind(role.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        // PostgreSQL error code 23505 = unique_violation on profiles.email:
        // a concurrent verification already created this account.
        let profile = match insert_result {
            Ok(profile) => profile,
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505") =>
            {
                return Err(CreateProfileError::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        if role == UserRole::PetOwner {
            sqlx::query(
                r#"
                INSERT INTO pet_owner_profiles (id, profile_id, created_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(profile_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(profile)
    }
}
