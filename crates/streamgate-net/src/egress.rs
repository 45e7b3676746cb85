//! Outbound HTTP client that refuses to dial non-public addresses.
//!
//! The address check happens inside the transport: hostnames go through
//! [`GuardedResolver`], so the addresses actually dialed are the ones that
//! were classified (no gap between validation and connect for a rebinding
//! DNS server to exploit). IP-literal hosts never reach a resolver and are
//! checked before the request is sent and on every redirect hop.

use std::error::Error as StdError;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::{redirect, Client, Response, Url};
use serde::Serialize;

use crate::ip::{check_ip, UnsafeDestination};

const MAX_REDIRECTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum EgressError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    UnsafeDestination(#[from] UnsafeDestination),

    #[error("dial timeout")]
    DialTimeout,

    #[error("too many redirects (max {0})")]
    TooManyRedirects(usize),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for EgressError {
    fn from(err: reqwest::Error) -> Self {
        // The resolver and redirect policy surface their refusals as boxed
        // sources somewhere down reqwest's error chain.
        let mut source: Option<&(dyn StdError + 'static)> = err.source();
        while let Some(inner) = source {
            if let Some(unsafe_dest) = inner.downcast_ref::<UnsafeDestination>() {
                return EgressError::UnsafeDestination(unsafe_dest.clone());
            }
            source = inner.source();
        }
        if err.is_timeout() {
            return EgressError::DialTimeout;
        }
        EgressError::Request(err)
    }
}

/// DNS resolver that fails the lookup when any resolved address is not public.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuardedResolver;

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await?
                .collect();

            if addrs.is_empty() {
                return Err(format!("no addresses found for {}", host).into());
            }
            // One bad record poisons the whole answer; the connector may try any of them.
            for addr in &addrs {
                if let Err(e) = check_ip(addr.ip()) {
                    tracing::warn!(host = %host, class = %e.class, "Blocked egress to non-public address");
                    return Err(e.into());
                }
            }

            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok(addrs)
        })
    }
}

/// Scheme and IP-literal checks for a URL about to be dialed.
fn check_url(url: &Url) -> Result<(), EgressError> {
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(EgressError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    }

    let host = url
        .host_str()
        .ok_or_else(|| EgressError::InvalidUrl("missing host".to_string()))?;
    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        check_ip(ip)?;
    }
    Ok(())
}

/// Verdict for a redirect hop to `url` after `previous` hops already taken.
fn check_redirect(url: &Url, previous: usize) -> Result<(), EgressError> {
    if previous >= MAX_REDIRECTS {
        return Err(EgressError::TooManyRedirects(MAX_REDIRECTS));
    }
    check_url(url)
}

fn redirect_policy() -> redirect::Policy {
    redirect::Policy::custom(|attempt| {
        let verdict = check_redirect(attempt.url(), attempt.previous().len());
        match verdict {
            Ok(()) => attempt.follow(),
            Err(EgressError::UnsafeDestination(e)) => {
                tracing::warn!(class = %e.class, "Blocked redirect to non-public address");
                attempt.error(e)
            }
            Err(e) => attempt.error(e.to_string()),
        }
    })
}

/// HTTP client whose every dial, including redirect hops, targets a public address.
#[derive(Clone, Debug)]
pub struct SafeHttpClient {
    client: Client,
}

/// Build a [`SafeHttpClient`]. `timeout` bounds the whole request, connect included.
pub fn new_safe_http_client(timeout: Duration) -> Result<SafeHttpClient, EgressError> {
    build_client(timeout, GuardedResolver)
}

fn build_client<R>(timeout: Duration, resolver: R) -> Result<SafeHttpClient, EgressError>
where
    R: Resolve + 'static,
{
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .dns_resolver(Arc::new(resolver))
        .redirect(redirect_policy())
        // A proxy would dial on our behalf and bypass the resolver.
        .no_proxy()
        .build()
        .map_err(EgressError::Request)?;

    Ok(SafeHttpClient { client })
}

impl SafeHttpClient {
    fn parse(&self, raw: &str) -> Result<Url, EgressError> {
        let url = Url::parse(raw).map_err(|e| EgressError::InvalidUrl(e.to_string()))?;
        check_url(&url)?;
        Ok(url)
    }

    pub async fn get(&self, raw: &str) -> Result<Response, EgressError> {
        let url = self.parse(raw)?;
        Ok(self.client.get(url).send().await?)
    }

    pub async fn post_json<T>(&self, raw: &str, body: &T) -> Result<Response, EgressError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.parse(raw)?;
        Ok(self.client.post(url).json(body).send().await?)
    }
}
