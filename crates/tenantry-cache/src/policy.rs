//! Expiry policy for cached lookups.

use std::time::Duration;

/// Present values live longer than "confirmed absent" markers so a
/// newly created entity is never hidden for long, while repeated lookups
/// for identities that do not exist still stop hitting the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// TTL for entities found in the store (default: 10 minutes).
    pub positive_ttl: Duration,
    /// TTL for "not found" markers (default: 5 minutes).
    pub negative_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            positive_ttl: Duration::from_secs(600),
            negative_ttl: Duration::from_secs(300),
        }
    }
}
