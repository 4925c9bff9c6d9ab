//! Cached [`RegistrationRepository`]: the atomic tenant + owner insert
//! with invalidation of both entities' keys after commit.

use tenantry_core::cache::CacheService;
use tenantry_core::error::TenantryResult;
use tenantry_core::models::registration::{CreateRegistration, Registration};
use tenantry_core::repository::RegistrationRepository;

use crate::aside::{CacheAside, Mutation};

const REGISTER: Mutation = Mutation {
    span: "repository.registration.create",
    success_metric: "repository.registration.create.success",
};

pub struct CachedRegistrationRepository<R, C> {
    inner: R,
    cache: CacheAside<C>,
}

impl<R, C> CachedRegistrationRepository<R, C> {
    pub fn new(inner: R, cache: CacheAside<C>) -> Self {
        Self { inner, cache }
    }
}

impl<R: Clone, C> Clone for CachedRegistrationRepository<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: RegistrationRepository, C: CacheService> RegistrationRepository
    for CachedRegistrationRepository<R, C>
{
    async fn register(&self, input: CreateRegistration) -> TenantryResult<Registration> {
        let tags = vec![
            ("tenant_name", input.tenant.name.clone()),
            ("email", input.owner.email.clone()),
        ];
        self.cache
            .write_through(REGISTER, tags, self.inner.register(input))
            .await
    }
}
