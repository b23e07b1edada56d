//! Domain models for VetBook.

pub mod registration;
pub mod user;

pub use registration::RegistrationData;
pub use user::{CreatedUser, UserRole};
