//! Management login and token verification.

use crate::auth::authenticator::secure_compare;
use crate::auth::{authenticate, issue_token, AuthError, IssuedToken};
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use std::sync::Arc;
use streamgate_core::AppError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

/// Exchange the management password for a signed token.
#[tracing::instrument(skip(state, request), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<IssuedToken>, HttpAppError> {
    let config = &state.config;

    let Some(expected) = config.mgmt_password.as_deref() else {
        tracing::warn!("Login attempted but no management password is configured");
        return Err(AppError::Unauthorized("login is disabled".to_string()).into());
    };
    if !secure_compare(&request.password, expected) {
        tracing::warn!("Login rejected: wrong password");
        return Err(AppError::Unauthorized("invalid password".to_string()).into());
    }
    if config.api_secret.is_empty() {
        return Err(AuthError::NoSecretConfigured.into());
    }

    let ttl = config
        .token_ttl()
        .ok_or_else(|| AppError::Internal("TOKEN_TTL_HOURS is out of range".to_string()))?;
    let issued = issue_token(&config.api_secret, ttl)?;
    tracing::info!(expires_at = %issued.expires_at, "Issued management token");

    Ok(Json(issued))
}

/// Check a token from the body (or the `Authorization` header, which wins).
#[tracing::instrument(skip(state, headers, request), fields(operation = "verify_token"))]
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<TokenRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    authenticate(&state.config.api_secret, Some(request.token.as_str()), &headers)?;
    Ok(Json(serde_json::json!({})))
}
