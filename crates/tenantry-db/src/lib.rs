//! Tenantry storage: SurrealDB connection management, schema bootstrap
//! and the repository implementations behind the `tenantry-core` ports.
//!
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema bootstrap ([`init_schema`])
//! - Error types ([`DbError`])
//! - Repositories ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::init_schema;
