//! Shared utilities and common types for the VetBook backend.
//!
//! This crate provides common functionality used across all other crates:
//! - One-time password generation and validation
//! - Password hashing with Argon2id
//! - Common validation logic

pub mod otp;
pub mod password;
pub mod validation;
