//! SurrealDB repository implementations.

mod registration;
mod tenant;
mod user;

pub use registration::SurrealRegistrationRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Whether a user row with `email` exists. Used to classify a failed
/// write as a unique-index violation on `user.email`.
async fn email_in_use<C: Connection>(db: &Surreal<C>, email: &str) -> Result<bool, DbError> {
    let mut result = db
        .query("SELECT count() AS total FROM user WHERE email = $email GROUP ALL")
        .bind(("email", email.to_string()))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    Ok(rows.first().is_some_and(|r| r.total > 0))
}

/// Turn a rejected write into [`DbError::UniqueViolation`] when the email
/// it tried to claim is already taken, or a plain query error otherwise.
async fn classify_write_error<C: Connection>(
    db: &Surreal<C>,
    email: &str,
    err: impl std::fmt::Display,
) -> DbError {
    match email_in_use(db, email).await {
        Ok(true) => DbError::UniqueViolation {
            entity: "user",
            field: "email",
        },
        Ok(false) => DbError::Query(err.to_string()),
        Err(lookup) => {
            tracing::warn!(error = %lookup, "could not classify failed write");
            DbError::Query(err.to_string())
        }
    }
}
