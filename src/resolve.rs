//! Target address resolution.
//!
//! Literal IPs are parsed synchronously; anything else goes through a
//! [Resolver], and the returned list is narrowed to one address, IPv4
//! preferred.

use crate::error::ProbeError;
use log::debug;
use std::{
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AddressFamily {
    V4,
    V6,
}

/// How a [ResolvedAddress] was obtained.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolution {
    Literal,
    Lookup,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ResolvedAddress {
    pub addr: SocketAddr,
    pub via: Resolution,
}

impl ResolvedAddress {
    pub fn family(&self) -> AddressFamily {
        match self.addr {
            SocketAddr::V4(_) => AddressFamily::V4,
            SocketAddr::V6(_) => AddressFamily::V6,
        }
    }
}

/// Asynchronous name lookup capability.
pub trait Resolver: Send + Sync + 'static {
    /// Every address `host:port` resolves to, in resolver order.
    fn lookup(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Vec<SocketAddr>>> + Send;
}

/// System resolver (`getaddrinfo` on tokio's blocking pool).
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok(tokio::net::lookup_host((host, port)).await?.collect())
    }
}

/// Parse `host` as a literal IPv4/IPv6 address (brackets allowed).
pub fn parse_literal(host: &str, port: u16) -> Result<ResolvedAddress, ProbeError> {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    bare.parse::<IpAddr>()
        .map(|ip| ResolvedAddress {
            addr: SocketAddr::new(ip, port),
            via: Resolution::Literal,
        })
        .map_err(|_| ProbeError::AddressParseAmbiguous {
            host: host.to_owned(),
        })
}

/// First IPv4 entry, otherwise the first entry of any family.
pub fn select_preferred<I>(addrs: I) -> Option<SocketAddr>
where
    I: IntoIterator<Item = SocketAddr>,
{
    let mut fallback = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        fallback.get_or_insert(addr);
    }
    fallback
}

/// Look `host` up through `resolver` and pick one address.
pub async fn resolve<R: Resolver>(
    resolver: &R,
    host: &str,
    port: u16,
) -> Result<ResolvedAddress, ProbeError> {
    let failed = |reason: String| ProbeError::ResolutionFailed {
        host: host.to_owned(),
        reason,
    };

    let addrs = resolver
        .lookup(host, port)
        .await
        .map_err(|err| failed(err.to_string()))?;
    debug!("{host} resolved to {} address(es)", addrs.len());

    select_preferred(addrs)
        .map(|addr| ResolvedAddress {
            addr,
            via: Resolution::Lookup,
        })
        .ok_or_else(|| failed("no addresses returned".into()))
}
