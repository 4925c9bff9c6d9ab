//! Session token issuance for successful logins.

use tenantry_core::models::user::User;

/// Issues the token returned by a successful login.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Option<String>;
}

/// No token format is defined yet; logins answer with `"token": null`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderTokenIssuer;

impl TokenIssuer for PlaceholderTokenIssuer {
    fn issue(&self, user: &User) -> Option<String> {
        tracing::debug!(user_id = %user.id, "no token issuer configured");
        None
    }
}
