//! Password hashing and verification using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// One-way credential digests.
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest in PHC string format.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
    /// `Err(AuthError::Crypto)` if the stored digest is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id with a random salt per hash and an optional server-side
/// pepper.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    pepper: Option<String>,
}

impl Argon2PasswordHasher {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper: config.pepper.clone(),
        })
    }

    fn peppered(&self, password: &str) -> Vec<u8> {
        match &self.pepper {
            Some(p) => format!("{p}{password}").into_bytes(),
            None => password.as_bytes().to_vec(),
        }
    }
}

impl std::fmt::Debug for Argon2PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2PasswordHasher")
            .field("peppered", &self.pepper.is_some())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2::PasswordHasher::hash_password(
            &self.argon2,
            &self.peppered(password),
            &salt,
        )
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

        match self
            .argon2
            .verify_password(&self.peppered(password), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
        }
    }
}
