//! Request and response bodies, with boundary validation.

use serde::{Deserialize, Serialize};
use tenantry_auth::{LoginInput, RegisterInput};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Tenant name.
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterResponse {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub token: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<RegisterInput, ApiError> {
        require("name", &self.name)?;
        require_email(&self.email)?;
        require("password", &self.password)?;
        Ok(RegisterInput {
            name: self.name.trim().to_string(),
            email: self.email,
            password: self.password,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<LoginInput, ApiError> {
        require_email(&self.email)?;
        require("password", &self.password)?;
        Ok(LoginInput {
            email: self.email,
            password: self.password,
        })
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), ApiError> {
    require("email", email)?;
    if !is_well_formed_email(email) {
        return Err(ApiError::BadRequest("email is not a valid address".into()));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace. Deliverability is not checked.
fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, rest)| !host.is_empty() && !rest.is_empty() && !rest.ends_with('.'))
}
