//! Callback URL validation and test delivery.

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use streamgate_net::{validate_callback_url, CallbackEvent};

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackTestResponse {
    /// HTTP status returned by the callback target.
    pub status: u16,
}

#[tracing::instrument(skip(request), fields(operation = "check_callback"))]
pub async fn check_callback(
    ValidatedJson(request): ValidatedJson<CallbackRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    validate_callback_url(&request.url).await?;
    Ok(Json(serde_json::json!({})))
}

/// Post a test event to the callback once.
#[tracing::instrument(skip(state, request), fields(operation = "test_callback"))]
pub async fn test_callback(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CallbackRequest>,
) -> Result<Json<CallbackTestResponse>, HttpAppError> {
    let status = state
        .callbacks
        .notifier
        .deliver(&request.url, &CallbackEvent::test())
        .await?;

    Ok(Json(CallbackTestResponse { status }))
}
