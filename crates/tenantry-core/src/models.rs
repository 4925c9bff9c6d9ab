//! Domain models for Tenantry.
//!
//! These are the core types shared across all crates.

pub mod registration;
pub mod tenant;
pub mod user;
