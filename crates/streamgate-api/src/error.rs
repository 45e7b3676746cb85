//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>` and let
//! `?` convert domain errors (`AuthError`, `AssetError`, `SsrfError`, ...) through the `From`
//! impls below, so every gate renders consistently (status, body, logging) and none of them
//! reflects canonical paths or resolved addresses to the caller.

use crate::auth::{AuthError, TokenError};
use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use streamgate_core::{AppError, ErrorMetadata, LogLevel};
use streamgate_media::{ParseError, SchemeError};
use streamgate_net::{EgressError, NotifyError, SsrfError};
use streamgate_storage::{AssetError, TraversalError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from streamgate-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
/// Use this instead of `Json<T>` when you want a consistent API error shape for invalid bodies.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production; elsewhere only for sensitive errors.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
            })
        };

        (status, body).into_response()
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<AuthError> for HttpAppError {
    fn from(err: AuthError) -> Self {
        HttpAppError(AppError::Unauthorized(err.to_string()))
    }
}

impl From<TokenError> for HttpAppError {
    fn from(err: TokenError) -> Self {
        let app = match err {
            TokenError::Signing(e) => AppError::Internal(format!("token signing failed: {}", e)),
            TokenError::LifetimeOutOfRange => {
                AppError::Internal("token lifetime is out of range".to_string())
            }
            _ => AppError::Unauthorized(AuthError::InvalidToken.to_string()),
        };
        HttpAppError(app)
    }
}

// Traversal attempts look exactly like missing files.
impl From<TraversalError> for HttpAppError {
    fn from(_: TraversalError) -> Self {
        HttpAppError(AppError::NotFound("File not found".to_string()))
    }
}

impl From<AssetError> for HttpAppError {
    fn from(err: AssetError) -> Self {
        let app = match err {
            AssetError::Traversal(e) => return e.into(),
            AssetError::ExtensionNotAllowed(_) => {
                AppError::Forbidden("File type not allowed".to_string())
            }
            AssetError::NotFound => AppError::NotFound("File not found".to_string()),
            AssetError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                AppError::NotFound("File not found".to_string())
            }
            AssetError::Io(e) => AppError::Internal(format!("IO error: {}", e)),
        };
        HttpAppError(app)
    }
}

impl From<SchemeError> for HttpAppError {
    fn from(err: SchemeError) -> Self {
        HttpAppError(AppError::InvalidInput(format!("invalid server: {}", err)))
    }
}

impl From<ParseError> for HttpAppError {
    fn from(err: ParseError) -> Self {
        HttpAppError(AppError::InvalidInput(format!("invalid server: {}", err)))
    }
}

impl From<SsrfError> for HttpAppError {
    fn from(err: SsrfError) -> Self {
        tracing::warn!(error = %err, "Callback url rejected");
        HttpAppError(AppError::InvalidInput(err.reason().to_string()))
    }
}

impl From<EgressError> for HttpAppError {
    fn from(err: EgressError) -> Self {
        let app = match err {
            EgressError::InvalidUrl(msg) => AppError::InvalidInput(format!("invalid url: {}", msg)),
            EgressError::UnsafeDestination(e) => {
                tracing::warn!(class = %e.class, "Outbound request blocked at dial time");
                AppError::Forbidden("destination is not allowed".to_string())
            }
            EgressError::DialTimeout => AppError::GatewayTimeout("upstream timed out".to_string()),
            EgressError::TooManyRedirects(max) => {
                AppError::BadGateway(format!("upstream redirected more than {} times", max))
            }
            EgressError::Request(e) => AppError::BadGateway(e.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<NotifyError> for HttpAppError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::Rejected(e) => e.into(),
            NotifyError::Egress(e) => e.into(),
        }
    }
}
