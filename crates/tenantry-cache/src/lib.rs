//! Tenantry Cache: cache backends and the cache-aside decorators that
//! sit in front of the durable repositories.
//!
//! Reads go cache first and populate on miss (with a shorter-lived
//! "absent" marker for lookups that found nothing); successful writes
//! delete every key derived from the written entity. Cache failures are
//! logged and treated as misses; they never reach the caller.

mod aside;
mod backend;
mod key;
mod policy;
pub mod repository;

pub use aside::{CacheAside, CachedValue, Lookup, Mutation};
pub use backend::{CacheBackend, MemoryCache, NoopCache};
pub use key::{CacheEntity, CacheKey, CacheKeys, tenant_id_key, user_email_key, user_id_key};
pub use policy::CachePolicy;
pub use repository::{CachedRegistrationRepository, CachedTenantRepository, CachedUserRepository};
