//! Repository implementations for database operations.

pub mod otp_verification;
pub mod profile;

pub use otp_verification::OtpVerificationRepository;
pub use profile::{CreateProfileError, ProfileRepository};
