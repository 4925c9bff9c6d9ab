//! Tenantry Server: HTTP surface over the authentication service and
//! the composition root that wires storage, cache and telemetry.

pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod token;

pub use config::Config;
pub use context::AppContext;
pub use routes::router;
pub use state::AppState;
