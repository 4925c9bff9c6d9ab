//! Tenantry Core: domain models, the shared error type, and the
//! contracts (repositories, cache, telemetry) every other crate plugs into.

pub mod cache;
pub mod error;
pub mod models;
pub mod repository;
pub mod telemetry;

pub use error::{TenantryError, TenantryResult};
