//! Tenantry Auth: tenant registration and password login.

pub mod config;
pub mod error;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use service::{AuthService, Authenticator, LoginInput, RegisterInput};
