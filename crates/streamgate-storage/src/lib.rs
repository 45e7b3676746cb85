//! Streamgate Storage Library
//!
//! Read-only access to the directories the control plane serves files from:
//! recorded HLS segments and voice prompts.
//!
//! # Containment
//!
//! Every caller-supplied reference is resolved through [`resolve_path`], which
//! judges containment on canonical paths. Served directories additionally
//! restrict which file types they hand out (see [`AssetRoot`]).

pub mod local;
pub mod resolver;

// Re-export commonly used types
pub use local::{content_type_for, Asset, AssetError, AssetResult, AssetRoot};
pub use resolver::{resolve_path, TraversalError};
