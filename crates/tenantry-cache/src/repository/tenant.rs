//! Cached [`TenantRepository`].

use tenantry_core::cache::CacheService;
use tenantry_core::error::TenantryResult;
use tenantry_core::models::tenant::{CreateTenant, Tenant};
use tenantry_core::repository::TenantRepository;
use uuid::Uuid;

use crate::aside::{CacheAside, Lookup, Mutation};
use crate::key::tenant_id_key;

const CREATE: Mutation = Mutation {
    span: "repository.tenant.create",
    success_metric: "repository.tenant.create.success",
};

const FIND_BY_ID: Lookup = Lookup {
    span: "repository.tenant.find_by_id",
    hit_metric: "repository.tenant.find_by_id.cache_hit",
    miss_metric: "repository.tenant.find_by_id.cache_miss",
    tag: "tenant_id",
};

pub struct CachedTenantRepository<R, C> {
    inner: R,
    cache: CacheAside<C>,
}

impl<R, C> CachedTenantRepository<R, C> {
    pub fn new(inner: R, cache: CacheAside<C>) -> Self {
        Self { inner, cache }
    }
}

impl<R: Clone, C> Clone for CachedTenantRepository<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: TenantRepository, C: CacheService> TenantRepository for CachedTenantRepository<R, C> {
    async fn create(&self, input: CreateTenant) -> TenantryResult<Tenant> {
        let tags = vec![("tenant_name", input.name.clone())];
        self.cache
            .write_through(CREATE, tags, self.inner.create(input))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> TenantryResult<Option<Tenant>> {
        self.cache
            .read_through(FIND_BY_ID, tenant_id_key(id), &id.to_string(), move || {
                self.inner.find_by_id(id)
            })
            .await
    }
}
