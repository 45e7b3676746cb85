use crate::auth::authenticator::authenticate;
use crate::error::HttpAppError;
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub api_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// `?token=` query parameter, percent-decoded.
fn token_from_query(request: &Request) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.token)
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let raw_token = token_from_query(&request);

    if let Err(e) = authenticate(
        &auth_state.api_secret,
        raw_token.as_deref(),
        request.headers(),
    ) {
        tracing::warn!(
            reason = %e,
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected unauthenticated request"
        );
        return HttpAppError::from(e).into_response();
    }

    next.run(request).await
}
