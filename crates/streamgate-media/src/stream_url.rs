//! Lenient parsing and rebuilding of stream URLs.
//!
//! Camera and encoder credentials routinely contain characters such as `@`,
//! `?` or `#` unescaped. A strict URL parser splits those in the wrong place,
//! so a URL whose authority reads cleanly as `host[:port]` is taken as is,
//! and otherwise the authority is carved out by hand: the userinfo ends at
//! the last `@` before the path. Username and password are then percent-encoded on their
//! own so the rebuilt string parses unambiguously downstream.
//!
//! `srt` URLs carry their options in a query tail (`?streamid=#!::r=...`)
//! that is handed to the transport verbatim and is never re-encoded.

use std::fmt;

use std::net::IpAddr;

use percent_encoding::{
    percent_decode_str, percent_encode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC,
};

use crate::target::split_scheme;

/// Characters escaped in userinfo: everything except unreserved characters
/// and the sub-delimiters that are unambiguous inside userinfo.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("url has no scheme")]
    MissingScheme,

    #[error("url has an empty host")]
    EmptyHost,

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("unterminated IPv6 host")]
    UnterminatedIpv6,
}

/// A parsed stream URL. `Display` renders the rebuilt, safely encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    pub scheme: String,
    /// Percent-encoded username.
    pub username: Option<String>,
    /// Percent-encoded password.
    pub password: Option<String>,
    /// Host as written; IPv6 hosts keep their brackets.
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    /// Query without the leading `?`, kept as written.
    pub query: Option<String>,
    /// Fragment without the leading `#`, kept as written.
    pub fragment: Option<String>,
}

impl StreamTarget {
    pub fn is_srt(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("srt")
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(username) = &self.username {
            f.write_str(username)?;
            if let Some(password) = &self.password {
                write!(f, ":{}", password)?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// Encode one userinfo component. Input that is already validly
/// percent-encoded is decoded first so it is not double-escaped; decoding
/// stays at the byte level so non-UTF-8 credentials survive unchanged.
fn encode_userinfo(component: &str) -> String {
    if is_valid_escaped(component) {
        let decoded: Vec<u8> = percent_decode_str(component).collect();
        percent_encode(&decoded, USERINFO).to_string()
    } else {
        utf8_percent_encode(component, USERINFO).to_string()
    }
}

/// True when every `%` begins a `%XX` hex escape.
fn is_valid_escaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

fn split_host_port(hostport: &str) -> Result<(String, Option<u16>), ParseError> {
    let (host, port) = if hostport.starts_with('[') {
        let close = hostport.find(']').ok_or(ParseError::UnterminatedIpv6)?;
        let (host, rest) = hostport.split_at(close + 1);
        match rest {
            "" => (host, None),
            _ => match rest.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => return Err(ParseError::InvalidPort(rest.to_string())),
            },
        }
    } else {
        match hostport.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (hostport, None),
        }
    };

    if host.is_empty() || host == "[]" {
        return Err(ParseError::EmptyHost);
    }

    let port = match port {
        Some(p) => Some(
            p.parse::<u16>()
                .map_err(|_| ParseError::InvalidPort(p.to_string()))?,
        ),
        None => None,
    };

    Ok((host.to_string(), port))
}

/// An authority without userinfo that reads as `host:port`, or as a bare IP
/// literal. Only such an authority is trusted over the lenient split.
fn strict_authority(authority: &str) -> Option<(String, Option<u16>)> {
    if authority.contains('@') {
        return None;
    }
    let (host, port) = split_host_port(authority).ok()?;
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(&host);
    if port.is_some() || bare.parse::<IpAddr>().is_ok() {
        Some((host, port))
    } else {
        None
    }
}

/// Parse `raw` leniently and re-encode its credentials.
///
/// Scheme, host, port and path are carried over unchanged. For non-srt
/// schemes the query and fragment are kept as written; for `srt` the whole
/// tail after the authority is preserved byte for byte.
pub fn rebuild_stream_url(raw: &str) -> Result<StreamTarget, ParseError> {
    let (scheme, rest) = split_scheme(raw.trim()).ok_or(ParseError::MissingScheme)?;
    let rest = rest.strip_prefix("//").ok_or(ParseError::MissingScheme)?;
    let srt = scheme.eq_ignore_ascii_case("srt");

    let strict_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());

    let (userinfo, host, port, tail) = match strict_authority(&rest[..strict_end]) {
        Some((host, port)) => (None, host, port, &rest[strict_end..]),
        None => {
            // The userinfo may contain '?' and '#'; only the path can end it.
            // srt options start right after the authority, so its search stops at them.
            let userinfo_end = if srt {
                strict_end
            } else {
                rest.find('/').unwrap_or(rest.len())
            };
            let (userinfo, after_userinfo) = match rest[..userinfo_end].rfind('@') {
                Some(at) => (Some(&rest[..at]), &rest[at + 1..]),
                None => (None, rest),
            };

            let authority_end = after_userinfo
                .find(['/', '?', '#'])
                .unwrap_or(after_userinfo.len());
            let (hostport, tail) = after_userinfo.split_at(authority_end);
            let (host, port) = split_host_port(hostport)?;
            (userinfo, host, port, tail)
        }
    };

    let (username, password) = match userinfo {
        Some(info) => match info.split_once(':') {
            Some((user, pass)) => (Some(encode_userinfo(user)), Some(encode_userinfo(pass))),
            None => (Some(encode_userinfo(info)), None),
        },
        None => (None, None),
    };

    let (path, query, fragment) = if srt {
        // Everything after '?' belongs to the query, '#' included.
        match tail.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string()), None),
            None => (tail.to_string(), None, None),
        }
    } else {
        let (before_fragment, fragment) = match tail.split_once('#') {
            Some((before, fragment)) => (before, Some(fragment.to_string())),
            None => (tail, None),
        };
        match before_fragment.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string()), fragment),
            None => (before_fragment.to_string(), None, fragment),
        }
    };

    Ok(StreamTarget {
        scheme: scheme.to_string(),
        username,
        password,
        host,
        port,
        path,
        query,
        fragment,
    })
}
