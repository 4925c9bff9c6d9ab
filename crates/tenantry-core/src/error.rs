//! Error types for the Tenantry system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenantryError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A natural key is already taken (e.g. a registered email).
    #[error("{field} already exists")]
    AlreadyExists { entity: String, field: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TenantryError {
    /// Conflict raised when a registration reuses an existing email.
    pub fn email_taken() -> Self {
        Self::AlreadyExists {
            entity: "user".into(),
            field: "email".into(),
        }
    }

    /// Whether the caller can act on this error (pick another email,
    /// fix the input, retry credentials) as opposed to an infrastructure
    /// failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::AuthenticationFailed { .. }
                | Self::Validation { .. }
        )
    }
}

pub type TenantryResult<T> = Result<T, TenantryError>;
