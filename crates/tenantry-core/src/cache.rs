//! Key/value cache contract with time-to-live expiry.
//!
//! The cache is an optimization, never a source of truth: callers treat
//! every [`CacheError`] as a miss. Values are opaque strings; typed
//! encoding happens one layer up so a hit can never be handed back as
//! the wrong entity shape.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

pub trait CacheService: Send + Sync {
    /// Returns `Ok(None)` when the key is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, CacheError>> + Send;
}
