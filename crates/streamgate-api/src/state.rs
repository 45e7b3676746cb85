//! Application state shared by all handlers.
//!
//! Everything here is built once at startup and never mutated; handlers get
//! an `Arc<AppState>` and pick the part they need.

use std::sync::Arc;

use streamgate_core::constants::{RECORD_EXTENSIONS, VOICE_EXTENSIONS};
use streamgate_core::Config;
use streamgate_net::{CallbackNotifier, EgressError};
use streamgate_storage::AssetRoot;

/// Directories the API serves files from.
#[derive(Clone, Debug)]
pub struct FileState {
    /// Recorded HLS segments, addressed as `{session_id}/{file}`.
    pub records: AssetRoot,
    /// Voice prompts played by the AI-talk stage.
    pub voices: AssetRoot,
}

#[derive(Clone, Debug)]
pub struct CallbackState {
    pub notifier: CallbackNotifier,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub files: FileState,
    pub callbacks: CallbackState,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, EgressError> {
        let files = FileState {
            records: AssetRoot::new(&config.record_dir, RECORD_EXTENSIONS),
            voices: AssetRoot::new(&config.voices_dir, VOICE_EXTENSIONS),
        };
        let callbacks = CallbackState {
            notifier: CallbackNotifier::new(config.callback_timeout())?,
        };

        Ok(Self {
            config: Arc::new(config),
            files,
            callbacks,
        })
    }
}
