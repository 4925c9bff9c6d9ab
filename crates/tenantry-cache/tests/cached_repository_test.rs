//! Behaviour of the cache-aside decorators against counting, failable
//! in-memory stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tenantry_cache::{
    CacheAside, CachePolicy, CachedRegistrationRepository, CachedTenantRepository,
    CachedUserRepository, MemoryCache, tenant_id_key, user_email_key,
};
use tenantry_core::cache::{CacheError, CacheService};
use tenantry_core::error::{TenantryError, TenantryResult};
use tenantry_core::models::registration::{CreateOwner, CreateRegistration, Registration};
use tenantry_core::models::tenant::{CreateTenant, Tenant};
use tenantry_core::models::user::{CreateUser, User};
use tenantry_core::repository::{RegistrationRepository, TenantRepository, UserRepository};
use tenantry_telemetry::RecordingTelemetry;
use uuid::Uuid;

// -----------------------------------------------------------------------
// Test doubles
// -----------------------------------------------------------------------

/// In-memory store that counts reads and can be switched into failure.
#[derive(Clone, Default)]
struct Store {
    tenants: Arc<Mutex<HashMap<Uuid, Tenant>>>,
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    reads: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl Store {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn check(&self) -> TenantryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(TenantryError::Database("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn insert_user(&self, input: CreateUser) -> TenantryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == input.email) {
            return Err(TenantryError::email_taken());
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            email: input.email,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    fn insert_tenant(&self, input: CreateTenant) -> Tenant {
        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        self.tenants
            .lock()
            .unwrap()
            .insert(tenant.id, tenant.clone());
        tenant
    }
}

impl UserRepository for Store {
    async fn create(&self, input: CreateUser) -> TenantryResult<User> {
        self.check()?;
        self.insert_user(input)
    }

    async fn find_by_id(&self, id: Uuid) -> TenantryResult<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> TenantryResult<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

impl TenantRepository for Store {
    async fn create(&self, input: CreateTenant) -> TenantryResult<Tenant> {
        self.check()?;
        Ok(self.insert_tenant(input))
    }

    async fn find_by_id(&self, id: Uuid) -> TenantryResult<Option<Tenant>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.tenants.lock().unwrap().get(&id).cloned())
    }
}

impl RegistrationRepository for Store {
    async fn register(&self, input: CreateRegistration) -> TenantryResult<Registration> {
        self.check()?;
        let tenant = self.insert_tenant(input.tenant);
        let user = self.insert_user(CreateUser {
            tenant_id: tenant.id,
            email: input.owner.email,
            password_hash: input.owner.password_hash,
        })?;
        Ok(Registration { tenant, user })
    }
}

/// Cache whose backend is always down.
struct BrokenCache;

impl CacheService for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection reset".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection reset".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection reset".into()))
    }

    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection reset".into()))
    }
}

/// Memory cache that remembers the TTL of every `set`.
#[derive(Default)]
struct TtlSpy {
    inner: MemoryCache,
    ttls: Mutex<Vec<(String, Duration)>>,
}

impl CacheService for TtlSpy {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.ttls.lock().unwrap().push((key.to_string(), ttl));
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.exists(key).await
    }
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

struct Harness<C> {
    store: Store,
    cache: Arc<C>,
    telemetry: RecordingTelemetry,
    users: CachedUserRepository<Store, C>,
    tenants: CachedTenantRepository<Store, C>,
    registrations: CachedRegistrationRepository<Store, C>,
}

fn harness<C: CacheService>(cache: C) -> Harness<C> {
    harness_with(cache, CachePolicy::default())
}

fn harness_with<C: CacheService>(cache: C, policy: CachePolicy) -> Harness<C> {
    let store = Store::default();
    let cache = Arc::new(cache);
    let telemetry = RecordingTelemetry::new();
    let aside = CacheAside::new(Arc::clone(&cache), Arc::new(telemetry.clone()), policy);
    Harness {
        users: CachedUserRepository::new(store.clone(), aside.clone()),
        tenants: CachedTenantRepository::new(store.clone(), aside.clone()),
        registrations: CachedRegistrationRepository::new(store.clone(), aside),
        store,
        cache,
        telemetry,
    }
}

fn seed_user(store: &Store, email: &str) -> User {
    let tenant = store.insert_tenant(CreateTenant {
        name: "Seed Co".into(),
    });
    store
        .insert_user(CreateUser {
            tenant_id: tenant.id,
            email: email.into(),
            password_hash: "hash".into(),
        })
        .unwrap()
}

// -----------------------------------------------------------------------
// Read-through
// -----------------------------------------------------------------------

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let h = harness(MemoryCache::new());
    let user = seed_user(&h.store, "alice@example.com");

    let first = h.users.find_by_email("alice@example.com").await.unwrap();
    let second = h.users.find_by_email("alice@example.com").await.unwrap();

    assert_eq!(first.as_ref(), Some(&user));
    assert_eq!(second.as_ref(), Some(&user));
    assert_eq!(h.store.reads(), 1, "second lookup must not reach the store");
    assert_eq!(
        h.telemetry
            .metric_count("repository.user.find_by_email.cache_miss"),
        1
    );
    assert_eq!(
        h.telemetry
            .metric_count("repository.user.find_by_email.cache_hit"),
        1
    );

    let spans = h.telemetry.spans_named("repository.user.find_by_email");
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].tag("cache_hit"), Some("false"));
    assert_eq!(spans[1].tag("cache_hit"), Some("true"));
    assert_eq!(spans[1].tag("email"), Some("alice@example.com"));
    assert!(h.telemetry.unbalanced_spans().is_empty());
}

#[tokio::test]
async fn lookups_by_id_and_email_use_separate_keys() {
    let h = harness(MemoryCache::new());
    let user = seed_user(&h.store, "bob@example.com");

    h.users.find_by_email("bob@example.com").await.unwrap();
    let by_id = h.users.find_by_id(user.id).await.unwrap();
    h.users.find_by_id(user.id).await.unwrap();

    assert_eq!(by_id, Some(user));
    assert_eq!(h.store.reads(), 2);
}

#[tokio::test]
async fn absent_result_is_negatively_cached() {
    let h = harness(MemoryCache::new());

    assert!(h.users.find_by_email("ghost@example.com").await.unwrap().is_none());
    assert!(h.users.find_by_email("ghost@example.com").await.unwrap().is_none());

    assert_eq!(h.store.reads(), 1);
    let hit = h
        .telemetry
        .metrics()
        .into_iter()
        .find(|m| m.name == "repository.user.find_by_email.cache_hit")
        .expect("absent marker should count as a hit");
    assert_eq!(hit.tag("outcome"), Some("absent"));
}

#[tokio::test]
async fn absent_marker_uses_the_shorter_ttl() {
    let h = harness(TtlSpy::default());
    seed_user(&h.store, "known@example.com");

    h.users.find_by_email("known@example.com").await.unwrap();
    h.users.find_by_email("unknown@example.com").await.unwrap();

    let ttls = h.cache.ttls.lock().unwrap().clone();
    let policy = CachePolicy::default();
    assert_eq!(
        ttls,
        vec![
            ("user:email:known@example.com".to_string(), policy.positive_ttl),
            ("user:email:unknown@example.com".to_string(), policy.negative_ttl),
        ]
    );
    assert!(policy.negative_ttl < policy.positive_ttl);
}

#[tokio::test]
async fn create_invalidates_prior_absent_marker() {
    let h = harness(MemoryCache::new());
    let tenant = h.store.insert_tenant(CreateTenant {
        name: "Acme".into(),
    });

    assert!(h.users.find_by_email("new@example.com").await.unwrap().is_none());

    let created = h
        .users
        .create(CreateUser {
            tenant_id: tenant.id,
            email: "new@example.com".into(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap();

    let found = h.users.find_by_email("new@example.com").await.unwrap();
    assert_eq!(found, Some(created));
    assert_eq!(h.store.reads(), 2, "lookup after create must reach the store");
    assert_eq!(
        h.telemetry.metric_count("repository.user.create.success"),
        1
    );
}

#[tokio::test]
async fn expired_entry_goes_back_to_the_store() {
    let h = harness_with(
        MemoryCache::new(),
        CachePolicy {
            positive_ttl: Duration::ZERO,
            ..CachePolicy::default()
        },
    );
    let user = seed_user(&h.store, "erin@example.com");

    h.users.find_by_email("erin@example.com").await.unwrap();
    let again = h.users.find_by_email("erin@example.com").await.unwrap();

    assert_eq!(again, Some(user));
    assert_eq!(h.store.reads(), 2, "expired entry must not be served");
    assert_eq!(
        h.telemetry
            .metric_count("repository.user.find_by_email.cache_miss"),
        2
    );
    assert_eq!(
        h.telemetry
            .metric_count("repository.user.find_by_email.cache_hit"),
        0
    );
}

#[tokio::test]
async fn oversized_ttls_still_cache() {
    let forever = Duration::from_secs(u64::MAX);
    let h = harness_with(
        MemoryCache::new(),
        CachePolicy {
            positive_ttl: forever,
            negative_ttl: forever,
        },
    );
    let missing = Uuid::new_v4();
    let user = seed_user(&h.store, "frank@example.com");

    for _ in 0..2 {
        assert!(h.tenants.find_by_id(missing).await.unwrap().is_none());
        assert_eq!(
            h.users.find_by_email("frank@example.com").await.unwrap(),
            Some(user.clone())
        );
    }

    assert_eq!(h.store.reads(), 2);
}

#[tokio::test]
async fn create_span_is_tagged_with_the_new_id() {
    let h = harness(MemoryCache::new());
    let tenant = h
        .tenants
        .create(CreateTenant {
            name: "Tagged Co".into(),
        })
        .await
        .unwrap();
    let user = h
        .users
        .create(CreateUser {
            tenant_id: tenant.id,
            email: "tagged@example.com".into(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap();

    let tenant_id = tenant.id.to_string();
    let user_id = user.id.to_string();
    let tenant_span = &h.telemetry.spans_named("repository.tenant.create")[0];
    assert_eq!(tenant_span.tag("tenant_id"), Some(tenant_id.as_str()));
    let user_span = &h.telemetry.spans_named("repository.user.create")[0];
    assert_eq!(user_span.tag("user_id"), Some(user_id.as_str()));
    assert_eq!(user_span.tag("tenant_id"), Some(tenant_id.as_str()));
}

// -----------------------------------------------------------------------
// Failure handling
// -----------------------------------------------------------------------

#[tokio::test]
async fn store_failure_is_an_error_not_absence_and_is_not_cached() {
    let h = harness(MemoryCache::new());
    h.store.fail(true);

    let err = h.users.find_by_email("alice@example.com").await.unwrap_err();
    assert!(matches!(err, TenantryError::Database(_)), "got {err:?}");
    assert!(h.cache.is_empty(), "errors must never be cached");

    let spans = h.telemetry.spans_named("repository.user.find_by_email");
    assert_eq!(
        spans[0].error.as_deref(),
        Some("Database error: connection refused")
    );
    assert!(h.telemetry.unbalanced_spans().is_empty());

    h.store.fail(false);
    assert!(h.users.find_by_email("alice@example.com").await.unwrap().is_none());
    assert_eq!(h.store.reads(), 2);
}

#[tokio::test]
async fn failed_create_leaves_cache_untouched() {
    let h = harness(MemoryCache::new());
    let key = user_email_key("late@example.com");

    h.users.find_by_email("late@example.com").await.unwrap();
    assert!(h.cache.exists(key.as_str()).await.unwrap());

    h.store.fail(true);
    let err = h
        .users
        .create(CreateUser {
            tenant_id: Uuid::new_v4(),
            email: "late@example.com".into(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TenantryError::Database(_)));
    assert!(h.cache.exists(key.as_str()).await.unwrap());
    assert_eq!(
        h.telemetry.metric_count("repository.user.create.success"),
        0
    );
    let span = &h.telemetry.spans_named("repository.user.create")[0];
    assert!(span.error.is_some());
    assert_eq!(span.end_count, 1);
}

#[tokio::test]
async fn broken_cache_falls_back_to_store() {
    let h = harness(BrokenCache);
    let user = seed_user(&h.store, "carol@example.com");

    for _ in 0..3 {
        let found = h.users.find_by_email("carol@example.com").await.unwrap();
        assert_eq!(found.as_ref(), Some(&user));
    }
    assert_eq!(h.store.reads(), 3);

    // Writes succeed even though invalidation fails.
    let tenant = h
        .tenants
        .create(CreateTenant {
            name: "Still Works".into(),
        })
        .await
        .unwrap();
    assert_eq!(tenant.name, "Still Works");
}

#[tokio::test]
async fn undecodable_payload_is_treated_as_miss() {
    let h = harness(MemoryCache::new());
    let user = seed_user(&h.store, "dave@example.com");
    let key = user_email_key("dave@example.com");

    // A tenant-shaped payload under a user key must not be returned.
    h.cache
        .set(
            key.as_str(),
            r#"{"state":"present","value":{"id":"x","name":"wrong"}}"#.into(),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    let found = h.users.find_by_email("dave@example.com").await.unwrap();
    assert_eq!(found, Some(user));
    assert_eq!(h.store.reads(), 1);
}

// -----------------------------------------------------------------------
// Tenant and registration decorators
// -----------------------------------------------------------------------

#[tokio::test]
async fn tenant_lookup_caches_and_create_invalidates() {
    let h = harness(MemoryCache::new());
    let missing = Uuid::new_v4();

    assert!(h.tenants.find_by_id(missing).await.unwrap().is_none());
    assert!(
        h.cache
            .exists(tenant_id_key(missing).as_str())
            .await
            .unwrap()
    );

    let tenant = h
        .tenants
        .create(CreateTenant {
            name: "Test Company".into(),
        })
        .await
        .unwrap();
    assert_eq!(h.tenants.find_by_id(tenant.id).await.unwrap(), Some(tenant.clone()));
    assert_eq!(h.tenants.find_by_id(tenant.id).await.unwrap(), Some(tenant.clone()));

    assert_eq!(h.store.reads(), 2);
    let spans = h.telemetry.spans_named("repository.tenant.find_by_id");
    assert_eq!(spans.last().unwrap().tag("tenant_id"), Some(tenant.id.to_string().as_str()));
    assert!(h.telemetry.unbalanced_spans().is_empty());
}

#[tokio::test]
async fn registration_invalidates_owner_email_marker() {
    let h = harness(MemoryCache::new());

    assert!(h.users.find_by_email("owner@example.com").await.unwrap().is_none());

    let registration = h
        .registrations
        .register(CreateRegistration {
            tenant: CreateTenant {
                name: "Owner Co".into(),
            },
            owner: CreateOwner {
                email: "owner@example.com".into(),
                password_hash: "hash".into(),
            },
        })
        .await
        .unwrap();

    let found = h.users.find_by_email("owner@example.com").await.unwrap();
    assert_eq!(found, Some(registration.user.clone()));
    let span = &h.telemetry.spans_named("repository.registration.create")[0];
    let user_id = registration.user.id.to_string();
    assert_eq!(span.tag("user_id"), Some(user_id.as_str()));
    assert_eq!(registration.user.tenant_id, registration.tenant.id);
    assert_eq!(
        h.telemetry
            .metric_count("repository.registration.create.success"),
        1
    );
}
