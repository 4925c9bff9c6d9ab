//! Cache backends: a process-local `DashMap` store and the no-op
//! backend used when caching is turned off.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tenantry_core::cache::{CacheError, CacheService};

/// Upper bound on entry lifetime. Larger TTLs are clamped so the
/// deadline stays representable as an `Instant`.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A cached payload with its expiry deadline.
#[derive(Clone, Debug)]
struct CachedEntry {
    payload: Arc<str>,
    expires_at: Instant,
}

impl CachedEntry {
    fn new(payload: String, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        Self {
            payload: payload.into(),
            expires_at,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Single-process TTL cache.
///
/// Expired entries are removed lazily when read and in bulk by
/// [`MemoryCache::purge_expired`]. Cloning shares the underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CachedEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }

    fn live(&self, key: &str) -> Option<Arc<str>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired());
            return None;
        }
        Some(Arc::clone(&entry.payload))
    }
}

impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let payload = self.live(key).map(|p| p.to_string());
        tracing::trace!(key = %key, hit = payload.is_some(), "memory cache get");
        Ok(payload)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), CachedEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live(key).is_some())
    }
}

/// Caching turned off: every read misses, writes are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCache;

impl CacheService for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}

/// Backend selected once at startup.
#[derive(Clone, Debug)]
pub enum CacheBackend {
    /// Process-local map.
    Memory(MemoryCache),
    Noop(NoopCache),
}

impl CacheBackend {
    pub fn memory() -> Self {
        CacheBackend::Memory(MemoryCache::new())
    }

    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::memory()
        } else {
            CacheBackend::Noop(NoopCache)
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            CacheBackend::Memory(_) => "memory",
            CacheBackend::Noop(_) => "disabled",
        }
    }
}

impl CacheService for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheBackend::Memory(cache) => cache.get(key).await,
            CacheBackend::Noop(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Memory(cache) => cache.set(key, value, ttl).await,
            CacheBackend::Noop(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            CacheBackend::Memory(cache) => cache.delete(key).await,
            CacheBackend::Noop(cache) => cache.delete(key).await,
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            CacheBackend::Memory(cache) => cache.exists(key).await,
            CacheBackend::Noop(cache) => cache.exists(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get() {
        let cache = MemoryCache::new();
        cache.set("user:id:1", "payload".into(), MINUTE).await.unwrap();

        assert_eq!(
            cache.get("user:id:1").await.unwrap().as_deref(),
            Some("payload")
        );
        assert!(cache.exists("user:id:1").await.unwrap());
        assert!(cache.get("user:id:2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::new();
        cache.set("k", "v".into(), MINUTE).await.unwrap();
        cache.delete("k").await.unwrap();

        assert!(!cache.exists("k").await.unwrap());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_evicted() {
        let cache = MemoryCache::new();
        cache.set("k", "v".into(), Duration::ZERO).await.unwrap();

        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn purge_expired_keeps_live_entries() {
        let cache = MemoryCache::new();
        cache.set("old", "v".into(), Duration::ZERO).await.unwrap();
        cache.set("new", "v".into(), MINUTE).await.unwrap();

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("new").await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        cache.set("k", "v".into(), MINUTE).await.unwrap();
        assert!(other.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn huge_ttl_is_clamped_instead_of_overflowing() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[tokio::test]
    async fn disabled_backend_always_misses() {
        let cache = CacheBackend::from_enabled(false);
        cache.set("k", "v".into(), MINUTE).await.unwrap();

        assert!(cache.get("k").await.unwrap().is_none());
        assert!(!cache.exists("k").await.unwrap());
        assert_eq!(cache.mode(), "disabled");
    }
}
