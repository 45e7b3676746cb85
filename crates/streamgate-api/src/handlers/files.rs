//! Recorded segments and voice prompts (no auth).
//!
//! Both routes resolve the caller's path through the storage crate, which
//! confines it to the configured directory and file types. Refusals render
//! as 403/404 and never echo the resolved path.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use streamgate_storage::Asset;

fn asset_response(asset: Asset) -> Response {
    (
        [
            (header::CONTENT_TYPE, asset.content_type),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        asset.bytes,
    )
        .into_response()
}

#[tracing::instrument(skip(state), fields(operation = "get_record_segment"))]
pub async fn get_record_segment(
    State(state): State<Arc<AppState>>,
    Path((session_id, file)): Path<(String, String)>,
) -> Result<Response, HttpAppError> {
    let segment = format!("{}/{}", session_id, file);
    let asset = state.files.records.read(&segment).await?;
    Ok(asset_response(asset))
}

#[tracing::instrument(skip(state), fields(operation = "get_hello_voice"))]
pub async fn get_hello_voice(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, HttpAppError> {
    let asset = state.files.voices.read(&file).await?;
    Ok(asset_response(asset))
}
