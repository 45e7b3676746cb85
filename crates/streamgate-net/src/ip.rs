//! Address classification shared by the egress client and callback validation.
//!
//! `classify` is total: every input maps to exactly one [`IpClass`]. Only
//! [`IpClass::Public`] addresses may be dialed on a caller's behalf.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpClass {
    Public,
    Loopback,
    Private,
    LinkLocal,
    Unspecified,
    Unparseable,
}

impl IpClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpClass::Public => "public",
            IpClass::Loopback => "loopback",
            IpClass::Private => "private",
            IpClass::LinkLocal => "link-local",
            IpClass::Unspecified => "unspecified",
            IpClass::Unparseable => "unparseable",
        }
    }
}

impl fmt::Display for IpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dial target refused because its address is not public.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid private ip {address} ({class})")]
pub struct UnsafeDestination {
    pub class: IpClass,
    pub address: String,
}

/// Classify a textual address. IPv6 literals may be bracketed.
pub fn classify(address: &str) -> IpClass {
    let trimmed = address.trim();
    let unbracketed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    match unbracketed.parse::<IpAddr>() {
        Ok(ip) => classify_ip(ip),
        Err(_) => IpClass::Unparseable,
    }
}

/// Classify a parsed address. Precedence: unspecified, loopback, private,
/// link-local, public.
pub fn classify_ip(ip: IpAddr) -> IpClass {
    match ip {
        IpAddr::V4(v4) => classify_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            // ::ffff:a.b.c.d must not slip past the IPv4 ranges.
            Some(v4) => classify_v4(v4),
            None => classify_v6(v6),
        },
    }
}

fn classify_v4(ip: Ipv4Addr) -> IpClass {
    if ip.is_unspecified() {
        IpClass::Unspecified
    } else if ip.is_loopback() {
        IpClass::Loopback
    } else if ip.is_private() {
        IpClass::Private
    } else if ip.is_link_local() {
        IpClass::LinkLocal
    } else {
        IpClass::Public
    }
}

fn classify_v6(ip: Ipv6Addr) -> IpClass {
    let first = ip.segments()[0];
    if ip.is_unspecified() {
        IpClass::Unspecified
    } else if ip.is_loopback() {
        IpClass::Loopback
    } else if first & 0xfe00 == 0xfc00 {
        // fc00::/7 unique local
        IpClass::Private
    } else if first & 0xffc0 == 0xfe80 {
        // fe80::/10
        IpClass::LinkLocal
    } else {
        IpClass::Public
    }
}

pub fn is_safe(address: &str) -> bool {
    classify(address) == IpClass::Public
}

/// Fail with [`UnsafeDestination`] unless `ip` is public.
pub fn check_ip(ip: IpAddr) -> Result<(), UnsafeDestination> {
    match classify_ip(ip) {
        IpClass::Public => Ok(()),
        class => Err(UnsafeDestination {
            class,
            address: ip.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        let cases = [
            ("127.0.0.1", IpClass::Loopback),
            ("127.255.0.9", IpClass::Loopback),
            ("::1", IpClass::Loopback),
            ("10.0.0.1", IpClass::Private),
            ("172.16.0.1", IpClass::Private),
            ("172.31.255.255", IpClass::Private),
            ("192.168.1.1", IpClass::Private),
            ("fc00::1", IpClass::Private),
            ("fd12:3456::1", IpClass::Private),
            ("169.254.169.254", IpClass::LinkLocal),
            ("fe80::1", IpClass::LinkLocal),
            ("0.0.0.0", IpClass::Unspecified),
            ("::", IpClass::Unspecified),
            ("8.8.8.8", IpClass::Public),
            ("172.32.0.1", IpClass::Public),
            ("2001:4860:4860::8888", IpClass::Public),
            ("not-an-ip", IpClass::Unparseable),
            ("", IpClass::Unparseable),
            ("256.1.1.1", IpClass::Unparseable),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(input), expected, "classify({input:?})");
        }
    }

    #[test]
    fn test_unsafe_addresses_never_public() {
        for addr in [
            "127.0.0.1",
            "10.0.0.1",
            "192.168.1.1",
            "169.254.1.1",
            "0.0.0.0",
            "::1",
        ] {
            assert!(!is_safe(addr), "{addr} must not be safe");
        }
        assert!(is_safe("8.8.8.8"));
    }

    #[test]
    fn test_ipv4_mapped_uses_embedded_address() {
        assert_eq!(classify("::ffff:127.0.0.1"), IpClass::Loopback);
        assert_eq!(classify("::ffff:10.0.0.1"), IpClass::Private);
        assert_eq!(classify("[::ffff:169.254.169.254]"), IpClass::LinkLocal);
        assert_eq!(classify("::ffff:8.8.8.8"), IpClass::Public);
    }

    #[test]
    fn test_bracketed_ipv6() {
        assert_eq!(classify("[::1]"), IpClass::Loopback);
    }

    #[test]
    fn test_check_ip_reports_class() {
        let err = check_ip("127.0.0.1".parse().unwrap()).unwrap_err();
        assert_eq!(err.class, IpClass::Loopback);
        assert_eq!(err.to_string(), "invalid private ip 127.0.0.1 (loopback)");
        assert!(check_ip("8.8.8.8".parse().unwrap()).is_ok());
    }
}
