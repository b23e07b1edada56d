//! Business services behind the HTTP handlers.

pub mod email;
pub mod rate_limit;
pub mod registration;

pub use email::{EmailError, EmailService};
pub use rate_limit::{RateLimitDecision, SendRateLimiter};
pub use registration::{IssuedOtp, RegistrationError, RegistrationService};
