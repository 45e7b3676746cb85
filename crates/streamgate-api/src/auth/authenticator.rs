//! Shared-secret authentication of API callers.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::Algorithm;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::auth::token::verify_signed_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no api secret configured")]
    NoSecretConfigured,

    #[error("no Authorization or token")]
    NoCredential,

    #[error("invalid Authorization format")]
    BadFormat,

    #[error("invalid bearer token")]
    InvalidToken,
}

/// Compare two strings in constant time.
///
/// Both sides are hashed first so neither the length nor the length of a
/// matching prefix shows up in the timing.
pub(crate) fn secure_compare(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());
    a.as_slice().ct_eq(b.as_slice()).into()
}

/// Authenticate a request.
///
/// The credential comes from the `Authorization: Bearer <value>` header when
/// present, otherwise from `raw_token`. It is accepted if it equals the
/// shared secret, or if it is an HS256 token signed with the shared secret
/// that has not expired.
pub fn authenticate(
    secret: &str,
    raw_token: Option<&str>,
    headers: &HeaderMap,
) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NoSecretConfigured);
    }

    let header = headers.get(AUTHORIZATION).filter(|h| !h.is_empty());
    let credential = match header {
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::BadFormat)?;
            value.strip_prefix("Bearer ").ok_or(AuthError::BadFormat)?
        }
        None => raw_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoCredential)?,
    };

    if credential.is_empty() {
        return Err(AuthError::InvalidToken);
    }

    if secure_compare(credential, secret) {
        return Ok(());
    }

    match verify_signed_token(secret, credential, Algorithm::HS256) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::debug!(error = %e, "Signed token rejected");
            Err(AuthError::InvalidToken)
        }
    }
}
