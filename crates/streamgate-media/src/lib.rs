//! Streamgate Media Library
//!
//! Validation and rebuilding of transcoder targets, transcoder argument
//! assembly, and scraping of transcoder progress output. Launching the
//! transcoder process is left to the caller.

pub mod argv;
pub mod progress;
pub mod stream_url;
pub mod target;

// Re-export commonly used types
pub use argv::{TargetError, TranscoderArgs};
pub use progress::{parse_progress_log, Progress, ProgressParseError};
pub use stream_url::{rebuild_stream_url, ParseError, StreamTarget};
pub use target::{validate_server_target, SchemeError, ALLOWED_TARGET_SCHEMES};
