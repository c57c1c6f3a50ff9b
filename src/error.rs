//! Error types.
//!
//! [ProbeError] covers everything that can go wrong inside one probe. None
//! of it escapes a running probe: attempt failures are folded into the
//! final [`ProbeResult`](crate::stats::ProbeResult). [Error] is the
//! application-level wrapper used by the engine and the binary.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// Host is not a literal IP; the asynchronous lookup path takes over.
    #[error("`{host}` is not a literal address")]
    AddressParseAmbiguous { host: String },

    #[error("failed to resolve `{host}`: {reason}")]
    ResolutionFailed { host: String, reason: String },

    #[error("failed to create socket: {0}")]
    SocketCreationFailed(#[source] io::Error),

    #[error("{0}")]
    ConnectFailed(#[source] io::Error),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestBuildError {
    #[error("target host is required")]
    MissingHost,
    #[error("target port is required and must be non-zero")]
    MissingPort,
    #[error("attempt count must be >= 1")]
    ZeroCount,
}

#[derive(Error, Debug)]
pub enum TcpingError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid probe request: {0}")]
    Request(#[from] RequestBuildError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Handy alias.
pub type Result<T> = std::result::Result<T, TcpingError>;
