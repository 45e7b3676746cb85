//! Transcoder target validation.
//!
//! A target ends up as a positional argument of the transcoder process, so
//! anything that could be read as an option or as a local/exotic protocol is
//! refused before it gets near an argument vector.

/// Schemes a transcoder may publish to or pull from.
pub const ALLOWED_TARGET_SCHEMES: &[&str] = &["rtmp", "rtmps", "rtsp", "srt"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemeError {
    #[error("server is empty")]
    Empty,

    #[error("server must not start with '-'")]
    FlagInjection,

    #[error("server has no scheme")]
    MissingScheme,

    #[error("scheme '{0}' is not allowed, expected one of rtmp, rtmps, rtsp, srt")]
    DisallowedScheme(String),
}

/// Split off a syntactically valid URL scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`).
pub(crate) fn split_scheme(raw: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = raw.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, rest))
}

pub fn validate_server_target(raw: &str) -> Result<(), SchemeError> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return Err(SchemeError::Empty);
    }
    if candidate.starts_with('-') {
        return Err(SchemeError::FlagInjection);
    }

    let (scheme, _) = split_scheme(candidate).ok_or(SchemeError::MissingScheme)?;
    let scheme = scheme.to_ascii_lowercase();
    if !ALLOWED_TARGET_SCHEMES.contains(&scheme.as_str()) {
        return Err(SchemeError::DisallowedScheme(scheme));
    }

    Ok(())
}
