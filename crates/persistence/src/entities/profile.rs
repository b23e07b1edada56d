//! Account profile entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Stored as text; parsed into `domain::models::UserRole` at the edges.
    pub user_role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row mapping for the pet_owner_profiles table, the role-specific
/// sub-profile created alongside pet-owner accounts.
#[derive(Debug, Clone, FromRow)]
pub struct PetOwnerProfileEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
}
