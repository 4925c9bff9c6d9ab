//! Route handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tenantry_auth::Authenticator;

use crate::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn register<A: Authenticator>(
    State(state): State<AppState<A>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;
    let registration = state.auth.register(request.validate()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            tenant_id: registration.tenant.id,
            user_id: registration.user.id,
        }),
    ))
}

pub async fn login<A: Authenticator>(
    State(state): State<AppState<A>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let user = state.auth.login(request.validate()?).await?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        token: state.tokens.issue(&user),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics<A>(State(state): State<AppState<A>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
