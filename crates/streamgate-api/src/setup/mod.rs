//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use streamgate_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(config = ?config, "Configuration loaded and validated successfully");
    if config.api_secret.is_empty() {
        tracing::warn!("API_SECRET is empty; every authenticated request will be refused");
    }

    let state = Arc::new(AppState::new(config).context("Failed to build callback client")?);
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
