//! Cached [`UserRepository`].

use tenantry_core::cache::CacheService;
use tenantry_core::error::TenantryResult;
use tenantry_core::models::user::{CreateUser, User};
use tenantry_core::repository::UserRepository;
use uuid::Uuid;

use crate::aside::{CacheAside, Lookup, Mutation};
use crate::key::{user_email_key, user_id_key};

const CREATE: Mutation = Mutation {
    span: "repository.user.create",
    success_metric: "repository.user.create.success",
};

const FIND_BY_ID: Lookup = Lookup {
    span: "repository.user.find_by_id",
    hit_metric: "repository.user.find_by_id.cache_hit",
    miss_metric: "repository.user.find_by_id.cache_miss",
    tag: "user_id",
};

const FIND_BY_EMAIL: Lookup = Lookup {
    span: "repository.user.find_by_email",
    hit_metric: "repository.user.find_by_email.cache_hit",
    miss_metric: "repository.user.find_by_email.cache_miss",
    tag: "email",
};

pub struct CachedUserRepository<R, C> {
    inner: R,
    cache: CacheAside<C>,
}

impl<R, C> CachedUserRepository<R, C> {
    pub fn new(inner: R, cache: CacheAside<C>) -> Self {
        Self { inner, cache }
    }
}

impl<R: Clone, C> Clone for CachedUserRepository<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: UserRepository, C: CacheService> UserRepository for CachedUserRepository<R, C> {
    async fn create(&self, input: CreateUser) -> TenantryResult<User> {
        let tags = vec![
            ("tenant_id", input.tenant_id.to_string()),
            ("email", input.email.clone()),
        ];
        self.cache
            .write_through(CREATE, tags, self.inner.create(input))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> TenantryResult<Option<User>> {
        self.cache
            .read_through(FIND_BY_ID, user_id_key(id), &id.to_string(), move || {
                self.inner.find_by_id(id)
            })
            .await
    }

    async fn find_by_email(&self, email: &str) -> TenantryResult<Option<User>> {
        self.cache
            .read_through(FIND_BY_EMAIL, user_email_key(email), email, move || {
                self.inner.find_by_email(email)
            })
            .await
    }
}
