use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    error::ApiError,
    info,
    store::AccountStore,
    types::{Credential, Credentials, SuccessResponse},
    warning,
};

use super::{AppState, invalid_body};

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Credential>), ApiError> {
    let Json(credentials) = payload.map_err(invalid_body)?;

    let credential = run_blocking(&state, move |accounts| accounts.signup(&credentials))
        .await
        .inspect_err(|e| warning!("Rejected signup: {}", e))?;

    info!("Created account {}", credential.username);
    Ok((StatusCode::CREATED, Json(credential)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Credential>, ApiError> {
    let Json(credentials) = payload.map_err(invalid_body)?;

    let credential = run_blocking(&state, move |accounts| accounts.login(&credentials))
        .await
        .inspect_err(|e| warning!("Rejected login: {}", e))?;

    info!("Logged in {}", credential.username);
    Ok(Json(credential))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    state.accounts.revoke(token)?;

    info!("Revoked session");
    Ok(Json(SuccessResponse { success: true }))
}

/// Rejects requests without a live session token.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    state
        .accounts
        .verify(token)
        .inspect_err(|e| warning!("Rejected request to {}: {}", request.uri().path(), e))?;

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))
}

// Argon2 hashing blocks; run it on the blocking pool.
async fn run_blocking<F>(state: &AppState, f: F) -> Result<Credential, ApiError>
where
    F: FnOnce(&AccountStore) -> Result<Credential, ApiError> + Send + 'static,
{
    let accounts = Arc::clone(&state.accounts);
    tokio::task::spawn_blocking(move || f(&accounts))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}
