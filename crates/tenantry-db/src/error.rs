//! Database-specific error types and conversions.

use tenantry_core::error::TenantryError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Schema bootstrap failed: {0}")]
    Schema(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed {entity} row: {message}")]
    Decode {
        entity: &'static str,
        message: String,
    },

    #[error("Unique constraint violated: {entity}.{field}")]
    UniqueViolation {
        entity: &'static str,
        field: &'static str,
    },
}

impl DbError {
    pub(crate) fn decode(entity: &'static str, message: impl std::fmt::Display) -> Self {
        DbError::Decode {
            entity,
            message: message.to_string(),
        }
    }
}

impl From<DbError> for TenantryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { entity, field } => TenantryError::AlreadyExists {
                entity: entity.into(),
                field: field.into(),
            },
            other => TenantryError::Database(other.to_string()),
        }
    }
}
