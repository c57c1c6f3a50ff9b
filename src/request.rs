//! Probe requests and their builder.

use crate::error::RequestBuildError;
use serde::Serialize;
use std::fmt;

/// Opaque token correlating a started probe with its completion.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize)]
pub struct ProbeId(pub u64);

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One measurement run against `host:port`, immutable once built.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ProbeRequest {
    pub id: ProbeId,
    pub host: String,
    pub port: u16,
    pub count: u32,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ProbeRequestBuilder {
    id: ProbeId,
    host: Option<String>,
    port: Option<u16>,
    count: Option<u32>,
}

impl ProbeRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: ProbeId) -> Self {
        self.id = id;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Number of connect attempts; defaults to 1.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn build(&self) -> Result<ProbeRequest, RequestBuildError> {
        let host = self
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(RequestBuildError::MissingHost)?;
        let port = self
            .port
            .filter(|&p| p != 0)
            .ok_or(RequestBuildError::MissingPort)?;
        let count = self.count.unwrap_or(1);
        if count == 0 {
            return Err(RequestBuildError::ZeroCount);
        }

        Ok(ProbeRequest {
            id: self.id,
            host: host.to_owned(),
            port,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_to_one() {
        let req = ProbeRequestBuilder::new()
            .with_host("example.com")
            .with_port(443)
            .build()
            .unwrap();
        assert_eq!(req.count, 1);
        assert_eq!(req.id, ProbeId(0));
    }

    #[test]
    fn rejects_zero_port_and_count() {
        let base = ProbeRequestBuilder::new().with_host("127.0.0.1");
        assert_eq!(
            base.clone().with_port(0).build(),
            Err(RequestBuildError::MissingPort)
        );
        assert_eq!(
            base.with_port(80).with_count(0).build(),
            Err(RequestBuildError::ZeroCount)
        );
    }

    #[test]
    fn rejects_blank_host() {
        let err = ProbeRequestBuilder::new()
            .with_host("  ")
            .with_port(80)
            .build()
            .unwrap_err();
        assert_eq!(err, RequestBuildError::MissingHost);
    }
}
