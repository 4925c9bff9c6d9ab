//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups return `Ok(None)` when
//! the entity does not exist; `Err` is reserved for store failures so
//! callers can tell "no such tenant" apart from "database unavailable".

use uuid::Uuid;

use crate::error::TenantryResult;
use crate::models::{
    registration::{CreateRegistration, Registration},
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
};

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = TenantryResult<Tenant>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = TenantryResult<Option<Tenant>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TenantryResult<User>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = TenantryResult<Option<User>>> + Send;
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TenantryResult<Option<User>>> + Send;
}

/// Persists a tenant and its owner as one unit: either both rows are
/// committed or neither is.
pub trait RegistrationRepository: Send + Sync {
    fn register(
        &self,
        input: CreateRegistration,
    ) -> impl Future<Output = TenantryResult<Registration>> + Send;
}
