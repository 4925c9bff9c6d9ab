//! Cache-aware decorators over the core repository ports.
//!
//! Each decorator implements the same trait as the store it wraps, so it
//! can be slotted in at the composition root without callers noticing.

mod registration;
mod tenant;
mod user;

pub use registration::CachedRegistrationRepository;
pub use tenant::CachedTenantRepository;
pub use user::CachedUserRepository;
