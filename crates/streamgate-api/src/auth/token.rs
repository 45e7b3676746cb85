//! HS256 signed tokens issued to management clients.
//!
//! Verification pins the algorithm: the header's declared `alg` is read and
//! compared with the expected algorithm before any signature work, so `none`
//! and asymmetric algorithms never reach the verifier.

use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use streamgate_core::constants::TOKEN_VERSION;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Token format version.
    pub v: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued token as returned by the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    #[serde(rename = "createAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expireAt")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token header")]
    MalformedHeader,

    #[error("algorithm '{0}' is not allowed")]
    DisallowedAlgorithm(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime is out of range")]
    LifetimeOutOfRange,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// The `alg` a token declares, read without trusting anything else in it.
fn declared_algorithm(token: &str) -> Result<String, TokenError> {
    let header_segment = token.split('.').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|_| TokenError::MalformedHeader)?;
    let header: RawHeader =
        serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedHeader)?;
    Ok(header.alg)
}

/// Verify `token` against `secret`, accepting only `expected` as algorithm.
pub fn verify_signed_token(
    secret: &str,
    token: &str,
    expected: Algorithm,
) -> Result<TokenClaims, TokenError> {
    let declared = declared_algorithm(token)?;
    match Algorithm::from_str(&declared) {
        Ok(alg) if alg == expected => {}
        _ => return Err(TokenError::DisallowedAlgorithm(declared)),
    }

    let mut validation = Validation::new(expected);
    validation.algorithms = vec![expected];
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e),
    })?;

    Ok(data.claims)
}

/// Issue an HS256 token signed with `secret`, valid for `ttl`.
pub fn issue_token(secret: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
    let created_at = Utc::now();
    let expires_at = created_at
        .checked_add_signed(ttl)
        .ok_or(TokenError::LifetimeOutOfRange)?;
    let claims = TokenClaims {
        v: TOKEN_VERSION.to_string(),
        nonce: Uuid::new_v4().simple().to_string(),
        iat: created_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)?;

    Ok(IssuedToken {
        token,
        created_at,
        expires_at,
    })
}
