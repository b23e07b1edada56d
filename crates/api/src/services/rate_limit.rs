//! OTP issuance rate limiting.
//!
//! Fixed-window accounting per email: each address may trigger a bounded
//! number of sends within a rolling window. The state is process-local and
//! resets on restart; a horizontally scaled deployment must replace this
//! with a shared store (e.g. a key-value cache) to keep the limit global.
//! Swapping the store means replacing this one struct, callers only see
//! [`RateLimitDecision`].

use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::RwLock};

/// Per-key window state.
#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    reset_time: DateTime<Utc>,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Sends left in the current window after this request.
    pub remaining_attempts: u32,
    /// When the current window expires.
    pub reset_time: DateTime<Utc>,
}

/// Fixed-window rate limiter keyed by email.
pub struct SendRateLimiter {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
    max_sends: u32,
    window: Duration,
}

impl SendRateLimiter {
    /// Create a limiter allowing `max_sends` per `window_secs` per email.
    pub fn new(max_sends: u32, window_secs: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_sends,
            window: Duration::seconds(window_secs),
        }
    }

    fn key_for(email: &str) -> String {
        format!("send_otp_{}", email.to_lowercase())
    }

    /// Records a send attempt for `email` and decides whether it may
    /// proceed.
    ///
    /// 1. No entry, or the window elapsed: reset to count 1, allowed.
    /// 2. At the limit inside the window: rejected, reset time reported.
    /// 3. Otherwise: increment, allowed.
    pub fn check(&self, email: &str) -> RateLimitDecision {
        let key = Self::key_for(email);
        let now = Utc::now();

        let mut entries = self.entries.write().unwrap();

        match entries.get_mut(&key) {
            Some(entry) if now <= entry.reset_time => {
                if entry.count >= self.max_sends {
                    return RateLimitDecision {
                        allowed: false,
                        remaining_attempts: 0,
                        reset_time: entry.reset_time,
                    };
                }
                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining_attempts: self.max_sends - entry.count,
                    reset_time: entry.reset_time,
                }
            }
            _ => {
                let entry = RateLimitEntry {
                    count: 1,
                    reset_time: now + self.window,
                };
                let reset_time = entry.reset_time;
                entries.insert(key, entry);
                RateLimitDecision {
                    allowed: true,
                    remaining_attempts: self.max_sends - 1,
                    reset_time,
                }
            }
        }
    }
}

impl std::fmt::Debug for SendRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendRateLimiter")
            .field("max_sends", &self.max_sends)
            .field("window_secs", &self.window.num_seconds())
            .field("active_entries", &self.entries.read().unwrap().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_send_allowed() {
        let limiter = SendRateLimiter::new(3, 3600);
        let decision = limiter.check("new@example.com");
        assert!(decision.allowed);
        assert_eq!(decision.remaining_attempts, 2);
    }

    #[test]
    fn test_remaining_counts_down_then_rejects() {
        let limiter = SendRateLimiter::new(3, 3600);

        let first = limiter.check("new@example.com");
        let second = limiter.check("new@example.com");
        let third = limiter.check("new@example.com");
        let fourth = limiter.check("new@example.com");

        assert!(first.allowed);
        assert_eq!(first.remaining_attempts, 2);
        assert!(second.allowed);
        assert_eq!(second.remaining_attempts, 1);
        assert!(third.allowed);
        assert_eq!(third.remaining_attempts, 0);
        assert!(!fourth.allowed);
        assert_eq!(fourth.remaining_attempts, 0);
        assert!(fourth.reset_time > Utc::now());
    }

    #[test]
    fn test_different_emails_independent() {
        let limiter = SendRateLimiter::new(1, 3600);

        assert!(limiter.check("a@example.com").allowed);
        assert!(limiter.check("b@example.com").allowed);
        assert!(!limiter.check("a@example.com").allowed);
        assert!(!limiter.check("b@example.com").allowed);
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let limiter = SendRateLimiter::new(1, 3600);

        assert!(limiter.check("Owner@Example.com").allowed);
        assert!(!limiter.check("owner@example.com").allowed);
    }

    #[test]
    fn test_elapsed_window_resets_entry() {
        // A zero-length window means every entry is immediately stale, so
        // each check resets to count 1 and is allowed.
        let limiter = SendRateLimiter::new(1, 0);

        assert!(limiter.check("new@example.com").allowed);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let decision = limiter.check("new@example.com");
        assert!(decision.allowed);
        assert_eq!(decision.remaining_attempts, 0);
    }

    #[test]
    fn test_rejection_reports_window_reset_time() {
        let limiter = SendRateLimiter::new(1, 3600);

        let first = limiter.check("new@example.com");
        let rejected = limiter.check("new@example.com");
        assert_eq!(rejected.reset_time, first.reset_time);
    }

    #[test]
    fn test_debug_format() {
        let limiter = SendRateLimiter::new(3, 3600);
        limiter.check("new@example.com");
        let debug = format!("{:?}", limiter);
        assert!(debug.contains("SendRateLimiter"));
        assert!(debug.contains("max_sends"));
        assert!(debug.contains("active_entries"));
    }
}
