//! Registration unit: a tenant created together with its owner.

use serde::{Deserialize, Serialize};

use super::tenant::{CreateTenant, Tenant};
use super::user::User;

/// Owner account created alongside a new tenant. The tenant id is
/// assigned by the store inside the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOwner {
    pub email: String,
    pub password_hash: String,
}

/// Input for the atomic tenant + owner insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistration {
    pub tenant: CreateTenant,
    pub owner: CreateOwner,
}

/// Both rows of a committed registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub tenant: Tenant,
    pub user: User,
}
