//! Shared constants: route prefixes and served-file allow-lists.

/// Prefix shared by every control-plane route.
pub const API_PREFIX: &str = "/terraform/v1";

/// Extensions served from the voice-prompt directory.
pub const VOICE_EXTENSIONS: &[&str] = &["aac", "mp3", "wav", "ogg", "opus", "m4a"];

/// Extensions served from the recordings directory (HLS artifacts).
pub const RECORD_EXTENSIONS: &[&str] = &["ts", "m3u8", "m4s", "mp4"];

/// Version claim written into issued signed tokens.
pub const TOKEN_VERSION: &str = "1.0";
