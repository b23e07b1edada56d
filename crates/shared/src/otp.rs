//! One-time password generation and validation.
//!
//! OTP codes are 6-digit numeric strings that gate account creation, so they
//! are drawn from the operating system CSPRNG rather than a general-purpose
//! PRNG.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, Rng};
use regex::Regex;

/// Number of digits in an OTP code.
pub const OTP_LENGTH: usize = 6;

lazy_static! {
    // [0-9] rather than \d: the regex crate's \d matches any Unicode
    // decimal digit, which would let fullwidth digits through.
    static ref OTP_FORMAT: Regex = Regex::new(r"^[0-9]{6}$").expect("valid OTP regex");
}

/// Generates a 6-digit OTP code, zero-padded, uniform over [0, 999999].
pub fn generate_otp() -> String {
    let code: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Returns true iff the code is exactly 6 ASCII digits.
pub fn is_valid_otp_format(code: &str) -> bool {
    OTP_FORMAT.is_match(code)
}

/// Strips all non-digit characters from user input and truncates to 6
/// characters, tolerating whitespace and separators people type or paste.
pub fn sanitize_otp(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(OTP_LENGTH)
        .collect()
}

/// Expiration timestamp for a code issued now.
pub fn otp_expiration(expiry_minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(expiry_minutes)
}

/// Returns true iff the current time is past `expires_at`.
pub fn is_otp_expired(expires_at: DateTime<Utc>) -> bool {
    Utc::now() > expires_at
}
