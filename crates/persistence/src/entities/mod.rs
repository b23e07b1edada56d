//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod otp_verification;
pub mod profile;

pub use otp_verification::OtpVerificationEntity;
pub use profile::{PetOwnerProfileEntity, ProfileEntity};
