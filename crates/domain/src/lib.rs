//! Domain layer for the VetBook backend.
//!
//! This crate contains the domain models: user roles, the created-account
//! identity, and the pending-registration payload.

pub mod models;
