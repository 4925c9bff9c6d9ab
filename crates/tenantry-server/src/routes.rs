//! Router assembly.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tenantry_auth::Authenticator;

use crate::handlers;
use crate::middleware::request_telemetry;
use crate::state::AppState;

pub fn router<A: Authenticator + 'static>(state: AppState<A>) -> Router {
    let telemetry = Arc::clone(&state.telemetry);

    let auth = Router::new()
        .route("/register", post(handlers::register::<A>))
        .route("/login", post(handlers::login::<A>));

    Router::new()
        .nest("/api/auth", auth)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics::<A>))
        .with_state(state)
        .layer(middleware::from_fn_with_state(telemetry, request_telemetry))
}
