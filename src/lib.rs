//! spahost: static file server with single-page-application fallback
//!
//! Paths recognized as static assets are served from the static directory;
//! every other path is answered with the index document so a client-side
//! router can take over. Responses carry `cache-control`, `server` and, on
//! 200, an `etag` computed over the body.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{Config, RouteMode, ServerConfig};
pub use error::{ConfigError, ServerError};
pub use server::Server;
