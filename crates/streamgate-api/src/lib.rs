//! Streamgate API Library
//!
//! This crate provides the HTTP surface of the control plane: authentication,
//! file serving, target and callback checks, and application setup.

// Module declarations
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
