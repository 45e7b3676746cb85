//! API constants
//!
//! Route paths served by the API. The prefix is shared with the rest of the
//! workspace through `streamgate_core::constants`.

pub use streamgate_core::constants::API_PREFIX;

/// Recorded HLS segment: `{session_id}/{file}` under the recordings root.
pub const RECORD_HLS_PATH: &str = "/hooks/record/hls/{session_id}/{file}";

/// Voice prompt under the voice-prompt root.
pub const HELLO_VOICES_PATH: &str = "/ai-talk/stage/hello-voices/{file}";

pub const LOGIN_PATH: &str = "/mgmt/login";
pub const TOKEN_PATH: &str = "/mgmt/token";
pub const TARGET_CHECK_PATH: &str = "/ffmpeg/targets/check";
pub const CALLBACK_CHECK_PATH: &str = "/hooks/callback/check";
pub const CALLBACK_TEST_PATH: &str = "/hooks/callback/test";

/// Largest JSON body accepted by the control endpoints.
pub const MAX_BODY_BYTES: usize = 64 * 1024;
