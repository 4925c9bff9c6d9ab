//! Cache key scheme: `{entity}:{field}:{value}`.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tenantry_core::models::registration::Registration;
use tenantry_core::models::tenant::Tenant;
use tenantry_core::models::user::User;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(entity: &str, field: &str, value: impl fmt::Display) -> Self {
        Self(format!("{entity}:{field}:{value}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every key a lookup by one of the value's natural keys would use.
/// Writes delete all of them.
pub trait CacheKeys {
    fn cache_keys(&self) -> Vec<CacheKey>;

    /// Span tags naming the stored identities, e.g. `("user_id", ..)`.
    fn id_tags(&self) -> Vec<(&'static str, String)>;
}

/// An entity that can be stored through the typed cache boundary.
pub trait CacheEntity: CacheKeys + Serialize + DeserializeOwned + Send + Sync {
    const ENTITY: &'static str;
}

pub fn user_id_key(id: Uuid) -> CacheKey {
    CacheKey::new(<User as CacheEntity>::ENTITY, "id", id)
}

pub fn user_email_key(email: &str) -> CacheKey {
    CacheKey::new(<User as CacheEntity>::ENTITY, "email", email)
}

pub fn tenant_id_key(id: Uuid) -> CacheKey {
    CacheKey::new(<Tenant as CacheEntity>::ENTITY, "id", id)
}

impl CacheEntity for User {
    const ENTITY: &'static str = "user";
}

impl CacheKeys for User {
    fn cache_keys(&self) -> Vec<CacheKey> {
        vec![user_id_key(self.id), user_email_key(&self.email)]
    }

    fn id_tags(&self) -> Vec<(&'static str, String)> {
        vec![("user_id", self.id.to_string())]
    }
}

impl CacheEntity for Tenant {
    const ENTITY: &'static str = "tenant";
}

impl CacheKeys for Tenant {
    fn cache_keys(&self) -> Vec<CacheKey> {
        vec![tenant_id_key(self.id)]
    }

    fn id_tags(&self) -> Vec<(&'static str, String)> {
        vec![("tenant_id", self.id.to_string())]
    }
}

impl CacheKeys for Registration {
    fn cache_keys(&self) -> Vec<CacheKey> {
        let mut keys = self.tenant.cache_keys();
        keys.extend(self.user.cache_keys());
        keys
    }

    fn id_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = self.tenant.id_tags();
        tags.extend(self.user.id_tags());
        tags
    }
}
