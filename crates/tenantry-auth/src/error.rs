//! Authentication error types.

use tenantry_core::error::TenantryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TenantryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => TenantryError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => TenantryError::Crypto(msg),
        }
    }
}
