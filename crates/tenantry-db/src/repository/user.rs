//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords arrive already hashed; this layer never sees plaintext.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantry_core::error::TenantryResult;
use tenantry_core::models::user::{CreateUser, User};
use tenantry_core::repository::UserRepository;
use uuid::Uuid;

use super::classify_write_error;
use crate::error::DbError;

/// Row for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
pub(super) struct UserRow {
    tenant_id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row that carries its record id via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    tenant_id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::decode("user", format!("invalid {field}: {e}")))
}

impl UserRow {
    pub(super) fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            tenant_id: parse_uuid("tenant_id", &self.tenant_id)?,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid("record id", &self.record_id)?,
            tenant_id: parse_uuid("tenant_id", &self.tenant_id)?,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Load one user by record id.
pub(super) async fn select_user<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Option<User>, DbError> {
    let mut result = db
        .query("SELECT * FROM type::record('user', $id)")
        .bind(("id", id.to_string()))
        .await?;

    let rows: Vec<UserRow> = result.take(0)?;
    rows.into_iter().next().map(|row| row.into_user(id)).transpose()
}

#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> TenantryResult<User> {
        let id = Uuid::new_v4();
        let email = input.email;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 tenant_id = $tenant_id, \
                 email = $email, \
                 password_hash = $password_hash",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("email", email.clone()))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) => return Err(classify_write_error(&self.db, &email, e).await.into()),
        };

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query(format!("CREATE user:{id} returned no row")))?;

        Ok(row.into_user(id)?)
    }

    async fn find_by_id(&self, id: Uuid) -> TenantryResult<Option<User>> {
        Ok(select_user(&self.db, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> TenantryResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(UserRowWithId::try_into_user)
            .transpose()?)
    }
}
