//! Common validation utilities for registrant data.

use validator::ValidationError;

/// Maximum length of a registrant's full name.
const MAX_FULL_NAME_LENGTH: usize = 100;

/// Maximum length of a phone number, generous enough for international
/// formats with separators.
const MAX_PHONE_LENGTH: usize = 32;

/// Normalizes an email address for storage and lookups: trimmed and
/// lowercased. All persistence-layer comparisons use the normalized form so
/// `Owner@Example.com` and `owner@example.com` refer to the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a registrant's full name: non-empty after trimming, bounded
/// length.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("full_name_empty");
        err.message = Some("Full name is required".into());
        return Err(err);
    }
    if trimmed.len() > MAX_FULL_NAME_LENGTH {
        let mut err = ValidationError::new("full_name_length");
        err.message = Some("Full name must be 100 characters or fewer".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a phone number: digits, spaces and the separators `+ - ( )`,
/// bounded length. Empty strings are rejected; optionality is decided by the
/// caller.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_PHONE_LENGTH {
        let mut err = ValidationError::new("phone_length");
        err.message = Some("Phone number must be 1-32 characters".into());
        return Err(err);
    }
    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'));
    if !valid_chars {
        let mut err = ValidationError::new("phone_chars");
        err.message = Some("Phone number contains invalid characters".into());
        return Err(err);
    }
    Ok(())
}
