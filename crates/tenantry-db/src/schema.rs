//! Table definitions for SurrealDB.
//!
//! Every statement is `IF NOT EXISTS`, so bootstrapping an already
//! initialized database is a no-op. Tables are SCHEMAFULL and UUIDs are
//! stored as strings.

use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

const SCHEMA: &str = "\
-- =======================================================================
-- Tenants
-- =======================================================================
DEFINE TABLE IF NOT EXISTS tenant SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS name ON TABLE tenant TYPE string;
DEFINE FIELD IF NOT EXISTS created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Users (email is unique across all tenants)
-- =======================================================================
DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE user TYPE string;
DEFINE FIELD IF NOT EXISTS email ON TABLE user TYPE string;
DEFINE FIELD IF NOT EXISTS password_hash ON TABLE user TYPE string;
DEFINE FIELD IF NOT EXISTS created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_user_email ON TABLE user \
    COLUMNS email UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_user_tenant ON TABLE user \
    COLUMNS tenant_id;
";

/// Define the `tenant` and `user` tables and their indexes.
pub async fn init_schema<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(SCHEMA)
        .await?
        .check()
        .map_err(|e| DbError::Schema(e.to_string()))?;

    info!("Schema ready");
    Ok(())
}
