//! SurrealDB implementation of [`RegistrationRepository`].
//!
//! The tenant and its owner are created in one transaction: if the user
//! insert fails (typically the unique email index) the tenant insert is
//! rolled back with it.

use surrealdb::{Connection, Surreal};
use tenantry_core::error::TenantryResult;
use tenantry_core::models::registration::{CreateRegistration, Registration};
use tenantry_core::repository::RegistrationRepository;
use tracing::debug;
use uuid::Uuid;

use super::classify_write_error;
use super::tenant::select_tenant;
use super::user::select_user;
use crate::error::DbError;

const REGISTER: &str = "\
BEGIN TRANSACTION;
CREATE type::record('tenant', $tenant_id) SET name = $name;
CREATE type::record('user', $user_id) SET \
    tenant_id = $tenant_id, \
    email = $email, \
    password_hash = $password_hash;
COMMIT TRANSACTION;
";

#[derive(Clone)]
pub struct SurrealRegistrationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRegistrationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn read_back(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Registration, DbError> {
        let tenant = select_tenant(&self.db, tenant_id)
            .await?
            .ok_or_else(|| DbError::Query(format!("tenant:{tenant_id} missing after commit")))?;
        let user = select_user(&self.db, user_id)
            .await?
            .ok_or_else(|| DbError::Query(format!("user:{user_id} missing after commit")))?;
        Ok(Registration { tenant, user })
    }
}

impl<C: Connection> RegistrationRepository for SurrealRegistrationRepository<C> {
    async fn register(&self, input: CreateRegistration) -> TenantryResult<Registration> {
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let email = input.owner.email;

        let result = self
            .db
            .query(REGISTER)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("name", input.tenant.name))
            .bind(("email", email.clone()))
            .bind(("password_hash", input.owner.password_hash))
            .await
            .map_err(DbError::from)?;

        if let Err(e) = result.check() {
            debug!(error = %e, "registration transaction rolled back");
            return Err(classify_write_error(&self.db, &email, e).await.into());
        }

        Ok(self.read_back(tenant_id, user_id).await?)
    }
}
