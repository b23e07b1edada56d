//! Pending-registration payload.
//!
//! The registrant's profile fields are captured at OTP issuance and held in
//! the OTP record's `verification_data` column until verification succeeds.
//! This typed struct is the schema for that payload; nothing else stores the
//! pending account.

use serde::{Deserialize, Serialize};
use shared::validation::{validate_full_name, validate_phone};
use validator::Validate;

use crate::models::UserRole;

/// Profile fields supplied with an OTP issuance request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    /// Display name for the account
    #[validate(custom(function = validate_full_name))]
    pub full_name: String,

    /// Password for the eventual account, hashed only at account creation
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Contact phone number
    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,

    /// Postal address
    #[validate(length(max = 200, message = "Address must be 200 characters or fewer"))]
    pub address: Option<String>,

    /// Account role; defaults to pet owner when unspecified
    #[serde(default)]
    pub user_role: Option<UserRole>,
}

impl RegistrationData {
    /// The role this registration resolves to.
    pub fn role(&self) -> UserRole {
        self.user_role.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_data() -> RegistrationData {
        RegistrationData {
            full_name: "A".to_string(),
            password: "pw123456".to_string(),
            phone: Some("555".to_string()),
            address: Some("x".to_string()),
            user_role: None,
        }
    }

    #[test]
    fn test_registration_data_valid() {
        assert!(valid_data().validate().is_ok());
    }

    #[test]
    fn test_registration_data_short_password() {
        let mut data = valid_data();
        data.password = "short".to_string();
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_registration_data_empty_name() {
        let mut data = valid_data();
        data.full_name = "  ".to_string();
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_registration_data_bad_phone() {
        let mut data = valid_data();
        data.phone = Some("not a phone!".to_string());
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_registration_data_optional_fields_absent() {
        let data = RegistrationData {
            full_name: "Owner".to_string(),
            password: "pw123456".to_string(),
            phone: None,
            address: None,
            user_role: None,
        };
        assert!(data.validate().is_ok());
        assert_eq!(data.role(), UserRole::PetOwner);
    }

    #[test]
    fn test_registration_data_explicit_role() {
        let mut data = valid_data();
        data.user_role = Some(UserRole::Veterinarian);
        assert_eq!(data.role(), UserRole::Veterinarian);
    }

    #[test]
    fn test_registration_data_round_trips_through_json() {
        // The payload is persisted as JSONB and read back at verification;
        // field names must survive the trip.
        let data = valid_data();
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("fullName").is_some());
        let back: RegistrationData = serde_json::from_value(value).unwrap();
        assert_eq!(back.full_name, data.full_name);
        assert_eq!(back.password, data.password);
    }

    #[test]
    fn test_registration_data_tolerates_missing_role_key() {
        let json = r#"{"fullName":"A","password":"pw123456","phone":"555","address":"x"}"#;
        let data: RegistrationData = serde_json::from_str(json).unwrap();
        assert_eq!(data.role(), UserRole::PetOwner);
    }
}
