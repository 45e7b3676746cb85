//! Pre-flight validation of webhook/callback URLs.
//!
//! Delivery still goes through [`crate::egress::SafeHttpClient`]; this check
//! exists so configuration endpoints can reject bad URLs up front with a
//! useful reason.

use std::net::IpAddr;

use reqwest::Url;
use tokio::net::lookup_host;

use crate::ip::{check_ip, UnsafeDestination};

/// Hostnames that name the local machine without going through DNS.
const LOOPBACK_ALIASES: &[&str] = &["localhost", "ip6-localhost"];

#[derive(Debug, thiserror::Error)]
pub enum SsrfError {
    #[error("empty url")]
    Empty,

    #[error("malformed url: {0}")]
    Malformed(String),

    #[error("unsupported scheme '{0}', only http and https are allowed")]
    UnsupportedScheme(String),

    #[error("url has no host")]
    MissingHost,

    #[error("host '{0}' is a loopback alias")]
    LoopbackAlias(String),

    #[error("host '{host}' could not be resolved: {reason}")]
    Unresolvable { host: String, reason: String },

    #[error(transparent)]
    UnsafeDestination(#[from] UnsafeDestination),
}

impl SsrfError {
    /// Reason suitable for an API response: never includes resolved addresses.
    pub fn reason(&self) -> &'static str {
        match self {
            SsrfError::Empty => "callback url is empty",
            SsrfError::Malformed(_) => "callback url is malformed",
            SsrfError::UnsupportedScheme(_) => "callback url must use http or https",
            SsrfError::MissingHost => "callback url has no host",
            SsrfError::LoopbackAlias(_) => "callback host is not allowed",
            SsrfError::Unresolvable { .. } => "callback host could not be resolved",
            SsrfError::UnsafeDestination(_) => "callback host resolves to a non-public address",
        }
    }
}

/// Validate a callback URL: http(s) only, no loopback alias, and every
/// address the host resolves to must be public.
pub async fn validate_callback_url(raw: &str) -> Result<(), SsrfError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SsrfError::Empty);
    }

    let url = Url::parse(raw).map_err(|e| SsrfError::Malformed(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(SsrfError::UnsupportedScheme(other.to_string())),
    }

    let host = url.host_str().ok_or(SsrfError::MissingHost)?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    let host = host.trim_end_matches('.');
    if host.is_empty() {
        return Err(SsrfError::MissingHost);
    }

    if LOOPBACK_ALIASES
        .iter()
        .any(|alias| host.eq_ignore_ascii_case(alias))
    {
        return Err(SsrfError::LoopbackAlias(host.to_string()));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        check_ip(ip)?;
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let addrs: Vec<IpAddr> = lookup_host((host, port))
        .await
        .map_err(|e| SsrfError::Unresolvable {
            host: host.to_string(),
            reason: e.to_string(),
        })?
        .map(|addr| addr.ip())
        .collect();

    if addrs.is_empty() {
        return Err(SsrfError::Unresolvable {
            host: host.to_string(),
            reason: "no addresses".to_string(),
        });
    }
    for ip in addrs {
        check_ip(ip)?;
    }

    Ok(())
}
