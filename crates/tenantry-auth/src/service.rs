//! Registration and login orchestration.

use std::sync::Arc;

use tenantry_core::error::{TenantryError, TenantryResult};
use tenantry_core::models::registration::{CreateOwner, CreateRegistration, Registration};
use tenantry_core::models::tenant::CreateTenant;
use tenantry_core::models::user::User;
use tenantry_core::repository::{RegistrationRepository, UserRepository};
use tenantry_core::telemetry::{Event, Metric, SpanGuard, TelemetryService};
use tracing::{Instrument, debug, info};

use crate::error::AuthError;
use crate::password::PasswordHasher;

/// Input for the registration flow.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Name of the tenant created for the new owner.
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for the login flow.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// What the HTTP layer needs from authentication.
pub trait Authenticator: Send + Sync {
    /// Create a tenant and its owning user.
    fn register(
        &self,
        input: RegisterInput,
    ) -> impl Future<Output = TenantryResult<Registration>> + Send;

    /// Check an email/password pair. Unknown email and wrong password
    /// fail with the same error.
    fn login(&self, input: LoginInput) -> impl Future<Output = TenantryResult<User>> + Send;
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has no
/// dependency on the database or cache crates. Both repositories are
/// expected to share one cache so that a registration invalidates the
/// "not found" entry left by its own uniqueness check.
pub struct AuthService<U, G, H> {
    users: U,
    registrations: G,
    hasher: H,
    telemetry: Arc<dyn TelemetryService>,
}

impl<U, G, H> AuthService<U, G, H>
where
    U: UserRepository,
    G: RegistrationRepository,
    H: PasswordHasher,
{
    pub fn new(users: U, registrations: G, hasher: H, telemetry: Arc<dyn TelemetryService>) -> Self {
        Self {
            users,
            registrations,
            hasher,
            telemetry,
        }
    }

    async fn register_in(
        &self,
        span: &mut SpanGuard,
        input: RegisterInput,
    ) -> TenantryResult<Registration> {
        self.telemetry
            .track_metric(Metric::counter("auth.register.attempt"));

        // 1. Email must be unused.
        match self.users.find_by_email(&input.email).await {
            Ok(Some(_)) => {
                span.set_tag("user_exists", "true");
                debug!("registration rejected, email in use");
                return Err(TenantryError::email_taken());
            }
            Ok(None) => {}
            Err(e) => return Err(fail(span, e)),
        }

        // 2. Hash the password.
        let password_hash = self
            .hasher
            .hash(&input.password)
            .map_err(|e| fail(span, e))?;

        // 3. Tenant and owner in one unit.
        let registration = match self
            .registrations
            .register(CreateRegistration {
                tenant: CreateTenant { name: input.name },
                owner: CreateOwner {
                    email: input.email,
                    password_hash,
                },
            })
            .await
        {
            Ok(registration) => registration,
            // Lost a race with a concurrent registration for this email.
            Err(e @ TenantryError::AlreadyExists { .. }) => {
                span.set_tag("user_exists", "true");
                return Err(e);
            }
            Err(e) => return Err(fail(span, e)),
        };

        let Registration { tenant, user } = &registration;
        info!(tenant_id = %tenant.id, user_id = %user.id, "tenant registered");
        self.telemetry.track_event(
            Event::new("auth.register.success")
                .with_property("user_id", user.id.to_string())
                .with_property("tenant_id", tenant.id.to_string())
                .with_property("email", user.email.as_str()),
        );

        Ok(registration)
    }

    async fn login_in(&self, span: &mut SpanGuard, input: LoginInput) -> TenantryResult<User> {
        self.telemetry
            .track_metric(Metric::counter("auth.login.attempt"));

        // 1. Look up the user.
        let user = match self.users.find_by_email(&input.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                span.set_tag("user_not_found", "true");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(fail(span, e)),
        };

        // 2. Verify password.
        let valid = self
            .hasher
            .verify(&input.password, &user.password_hash)
            .map_err(|e| fail(span, e))?;
        if !valid {
            span.set_tag("invalid_password", "true");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "login succeeded");
        self.telemetry.track_event(
            Event::new("auth.login.success")
                .with_property("user_id", user.id.to_string())
                .with_property("email", user.email.as_str()),
        );

        Ok(user)
    }
}

impl<U, G, H> Authenticator for AuthService<U, G, H>
where
    U: UserRepository,
    G: RegistrationRepository,
    H: PasswordHasher,
{
    async fn register(&self, input: RegisterInput) -> TenantryResult<Registration> {
        let mut span = self.telemetry.start_span("auth.register_user");
        let current = span.tracing_span();
        self.register_in(&mut span, input).instrument(current).await
    }

    async fn login(&self, input: LoginInput) -> TenantryResult<User> {
        let mut span = self.telemetry.start_span("auth.login_user");
        let current = span.tracing_span();
        self.login_in(&mut span, input).instrument(current).await
    }
}

/// Record an infrastructure failure on the span and hand it back.
fn fail(span: &mut SpanGuard, err: impl Into<TenantryError>) -> TenantryError {
    let err = err.into();
    span.set_error(&err);
    err
}
