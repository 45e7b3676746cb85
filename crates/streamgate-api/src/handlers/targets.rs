//! Transcoder target checks.

use crate::error::{HttpAppError, ValidatedJson};
use axum::Json;
use serde::{Deserialize, Serialize};
use streamgate_media::{rebuild_stream_url, validate_server_target};

#[derive(Debug, Deserialize)]
pub struct TargetCheckRequest {
    pub server: String,
}

#[derive(Debug, Serialize)]
pub struct TargetCheckResponse {
    /// The target as it would be handed to the transcoder.
    pub target: String,
}

#[tracing::instrument(skip(request), fields(operation = "check_target"))]
pub async fn check_target(
    ValidatedJson(request): ValidatedJson<TargetCheckRequest>,
) -> Result<Json<TargetCheckResponse>, HttpAppError> {
    validate_server_target(&request.server)?;
    let target = rebuild_stream_url(&request.server)?;

    Ok(Json(TargetCheckResponse {
        target: target.to_string(),
    }))
}
