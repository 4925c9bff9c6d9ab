//! Generic cache-aside machinery shared by the repository decorators.
//!
//! Payloads cross an explicit serialization boundary: values are stored
//! as JSON-encoded [`CachedValue<T>`], and a payload that does not decode
//! into the expected `T` is deleted and treated as a miss.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tenantry_core::cache::CacheService;
use tenantry_core::error::TenantryResult;
use tenantry_core::telemetry::{Metric, SpanGuard, TelemetryService};
use tracing::Instrument;

use crate::key::{CacheEntity, CacheKey, CacheKeys};
use crate::policy::CachePolicy;

/// What the cache remembers about a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum CachedValue<T> {
    Present(T),
    /// The store confirmed there is no such entity.
    Absent,
}

impl<T> CachedValue<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            CachedValue::Present(value) => Some(value),
            CachedValue::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for CachedValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => CachedValue::Present(value),
            None => CachedValue::Absent,
        }
    }
}

/// Names a read-through lookup: the span it opens, the metrics it emits
/// and the span tag carrying the looked-up value.
#[derive(Debug, Clone, Copy)]
pub struct Lookup {
    pub span: &'static str,
    pub hit_metric: &'static str,
    pub miss_metric: &'static str,
    pub tag: &'static str,
}

/// Names a write: its span and the metric emitted on success.
#[derive(Debug, Clone, Copy)]
pub struct Mutation {
    pub span: &'static str,
    pub success_metric: &'static str,
}

/// Cache + telemetry + policy, shared by every decorator built on the
/// same cache. Cheap to clone.
pub struct CacheAside<C> {
    cache: Arc<C>,
    telemetry: Arc<dyn TelemetryService>,
    policy: CachePolicy,
}

impl<C> Clone for CacheAside<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            telemetry: Arc::clone(&self.telemetry),
            policy: self.policy,
        }
    }
}

impl<C: CacheService> CacheAside<C> {
    pub fn new(cache: Arc<C>, telemetry: Arc<dyn TelemetryService>, policy: CachePolicy) -> Self {
        Self {
            cache,
            telemetry,
            policy,
        }
    }

    /// Read `key` from the cache. `None` means "go to the store": the key
    /// was missing, the backend failed, or the payload did not decode.
    pub async fn get<T: CacheEntity>(&self, key: &CacheKey) -> Option<CachedValue<T>> {
        let payload = match self.cache.get(key.as_str()).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache get failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CachedValue<T>>(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    entity = T::ENTITY,
                    error = %e,
                    "discarding undecodable cache payload"
                );
                self.delete(key).await;
                None
            }
        }
    }

    /// Store a lookup result. Present values use the positive TTL,
    /// absent markers the negative one.
    pub async fn put<T: CacheEntity>(&self, key: &CacheKey, value: &CachedValue<T>) {
        let ttl = match value {
            CachedValue::Present(_) => self.policy.positive_ttl,
            CachedValue::Absent => self.policy.negative_ttl,
        };
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache payload encoding failed");
                return;
            }
        };
        if let Err(e) = self.cache.set(key.as_str(), payload, ttl).await {
            tracing::warn!(key = %key, error = %e, "cache set failed");
        }
    }

    pub async fn invalidate(&self, keys: &[CacheKey]) {
        for key in keys {
            self.delete(key).await;
        }
    }

    async fn delete(&self, key: &CacheKey) {
        if let Err(e) = self.cache.delete(key.as_str()).await {
            tracing::warn!(key = %key, error = %e, "cache delete failed");
        }
    }

    /// Cache-aside read: serve from cache when possible, otherwise call
    /// `load` and remember its answer (including "not found").
    ///
    /// Store errors propagate unchanged, are recorded on the span, and are
    /// never cached.
    pub async fn read_through<T, F, Fut>(
        &self,
        lookup: Lookup,
        key: CacheKey,
        tag_value: &str,
        load: F,
    ) -> TenantryResult<Option<T>>
    where
        T: CacheEntity,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = TenantryResult<Option<T>>> + Send,
    {
        let mut span = self.telemetry.start_span(lookup.span);
        span.set_tag(lookup.tag, tag_value);
        let current = span.tracing_span();

        self.read_through_in(&mut span, lookup, key, load)
            .instrument(current)
            .await
    }

    async fn read_through_in<T, F, Fut>(
        &self,
        span: &mut SpanGuard,
        lookup: Lookup,
        key: CacheKey,
        load: F,
    ) -> TenantryResult<Option<T>>
    where
        T: CacheEntity,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = TenantryResult<Option<T>>> + Send,
    {
        if let Some(cached) = self.get::<T>(&key).await {
            let outcome = match cached {
                CachedValue::Present(_) => "present",
                CachedValue::Absent => "absent",
            };
            span.set_tag("cache_hit", "true");
            tracing::debug!(key = %key, outcome, "cache hit");
            self.telemetry.track_metric(
                Metric::counter(lookup.hit_metric)
                    .with_tag("entity", T::ENTITY)
                    .with_tag("outcome", outcome),
            );
            return Ok(cached.into_option());
        }

        span.set_tag("cache_hit", "false");
        tracing::debug!(key = %key, "cache miss");
        self.telemetry
            .track_metric(Metric::counter(lookup.miss_metric).with_tag("entity", T::ENTITY));

        let found = match load().await {
            Ok(found) => found,
            Err(e) => {
                span.set_error(&e);
                return Err(e);
            }
        };

        let value = CachedValue::from(found);
        self.put(&key, &value).await;
        Ok(value.into_option())
    }

    /// Run a store write inside a span; on success tag the span with the
    /// written ids, delete every cache key of the written value and emit
    /// the success metric. On failure the
    /// cache is left untouched.
    pub async fn write_through<T, Fut>(
        &self,
        mutation: Mutation,
        tags: Vec<(&'static str, String)>,
        store: Fut,
    ) -> TenantryResult<T>
    where
        T: CacheKeys + Send,
        Fut: Future<Output = TenantryResult<T>> + Send,
    {
        let mut span = self.telemetry.start_span(mutation.span);
        for (key, value) in tags {
            span.set_tag(key, value);
        }

        let written = match store.instrument(span.tracing_span()).await {
            Ok(written) => written,
            Err(e) => {
                span.set_error(&e);
                return Err(e);
            }
        };

        for (key, value) in written.id_tags() {
            span.set_tag(key, value);
        }
        let keys = written.cache_keys();
        self.invalidate(&keys).await;
        span.set_tag("invalidated_keys", keys.len().to_string());
        self.telemetry.track_metric(Metric::counter(mutation.success_metric));

        Ok(written)
    }
}
