//! Error types
//!
//! Configuration errors are fatal at startup, server errors are fatal for the listener.
//! Nothing in here is ever produced while handling a single request.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ParseDurationError;

/// Invalid or unloadable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid cache duration '{value}': {source}")]
    CacheDuration {
        value: String,
        #[source]
        source: ParseDurationError,
    },

    #[error("TLS needs both a certificate and a key file (cert: {cert:?}, key: {key:?})")]
    IncompleteTls {
        cert: Option<PathBuf>,
        key: Option<PathBuf>,
    },

    #[error("invalid static file pattern: {0}")]
    StaticPattern(#[from] regex::Error),

    #[error("no static file extensions configured")]
    NoStaticExtensions,

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Listener failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot resolve listen address '{addr}': {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("cannot read TLS file {path}: {source}")]
    TlsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no certificates found in {0}")]
    TlsNoCertificates(PathBuf),

    #[error("no private key found in {0}")]
    TlsNoPrivateKey(PathBuf),

    #[error("invalid TLS configuration: {0}")]
    Tls(#[from] rustls::Error),
}
