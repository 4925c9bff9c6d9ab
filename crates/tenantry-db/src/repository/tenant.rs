//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenantry_core::error::TenantryResult;
use tenantry_core::models::tenant::{CreateTenant, Tenant};
use tenantry_core::repository::TenantRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub(super) struct TenantRow {
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    pub(super) fn into_tenant(self, id: Uuid) -> Tenant {
        Tenant {
            id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Load one tenant by record id.
pub(super) async fn select_tenant<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Option<Tenant>, DbError> {
    let mut result = db
        .query("SELECT * FROM type::record('tenant', $id)")
        .bind(("id", id.to_string()))
        .await?;

    let rows: Vec<TenantRow> = result.take(0)?;
    Ok(rows.into_iter().next().map(|row| row.into_tenant(id)))
}

#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> TenantryResult<Tenant> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query("CREATE type::record('tenant', $id) SET name = $name")
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query(format!("CREATE tenant:{id} returned no row")))?;

        Ok(row.into_tenant(id))
    }

    async fn find_by_id(&self, id: Uuid) -> TenantryResult<Option<Tenant>> {
        Ok(select_tenant(&self.db, id).await?)
    }
}
