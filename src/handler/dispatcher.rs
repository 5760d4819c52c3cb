//! Request dispatch
//!
//! Classifies the request path, delegates to the file server (for assets) or
//! sends the index document (for application routes), then decorates the
//! response with caching and identity headers and writes the access log.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};

use crate::config::{parse_duration, ServerConfig};
use crate::error::ConfigError;
use crate::handler::classifier::PathClassifier;
use crate::handler::static_files::FileServer;
use crate::handler::RequestContext;
use crate::http::{etag, FileResponse};
use crate::logger::{AccessLogEntry, Logger, NopLogger};

/// Value of the `server` response header
pub const SERVER_NAME: &str = concat!("spahost/", env!("CARGO_PKG_VERSION"));

/// What produced the response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeTarget {
    /// The request path, served as a file
    Asset(String),
    /// The index document, served for an application route
    Index(String),
}

impl fmt::Display for ServeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(path) => f.write_str(path),
            Self::Index(file) => f.write_str(file),
        }
    }
}

/// Result of resolving one request, before headers are attached
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub path: String,
    pub target: ServeTarget,
    pub response: FileResponse,
}

pub struct Dispatcher {
    classifier: PathClassifier,
    file_server: Arc<dyn FileServer>,
    index_file: String,
    index_path: PathBuf,
    cache_control: HeaderValue,
    weak_etag: bool,
    access_log_format: Option<String>,
    logger: Arc<dyn Logger>,
}

impl Dispatcher {
    /// Build the dispatcher, validating the cache duration and static pattern
    pub fn new(
        config: &ServerConfig,
        file_server: Arc<dyn FileServer>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, ConfigError> {
        let max_age = parse_duration(&config.cache_duration)
            .map_err(|source| ConfigError::CacheDuration {
                value: config.cache_duration.clone(),
                source,
            })?
            .as_secs();

        Ok(Self {
            classifier: PathClassifier::from_config(config)?,
            index_path: config.static_dir.join(&config.index_file),
            index_file: config.index_file.clone(),
            cache_control: cache_control_value(max_age),
            weak_etag: config.weak_etag,
            access_log_format: Some("default".to_string()),
            file_server,
            logger,
        })
    }

    /// Dispatcher with a no-op logger
    pub fn without_logger(
        config: &ServerConfig,
        file_server: Arc<dyn FileServer>,
    ) -> Result<Self, ConfigError> {
        Self::new(config, file_server, Arc::new(NopLogger))
    }

    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    /// Access log format name or pattern; None disables access logging
    pub fn set_access_log_format(&mut self, format: Option<String>) {
        self.access_log_format = format;
    }

    pub const fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    /// Precomputed `cache-control` value
    pub const fn cache_control(&self) -> &HeaderValue {
        &self.cache_control
    }

    /// Classify the request and produce the file server's response
    pub async fn resolve(&self, ctx: &RequestContext) -> RequestOutcome {
        let (target, response) = if self.classifier.is_static(&ctx.path, &*self.logger).await {
            (
                ServeTarget::Asset(ctx.path.clone()),
                self.file_server.serve(ctx).await,
            )
        } else {
            (
                ServeTarget::Index(self.index_file.clone()),
                self.file_server.send_file(&self.index_path, ctx).await,
            )
        };

        RequestOutcome {
            path: ctx.path.clone(),
            target,
            response,
        }
    }

    /// Attach cache, identity and entity tag headers
    ///
    /// The entity tag is only set on 200 and always covers the full body.
    pub fn finalize(&self, response: &mut FileResponse) {
        response
            .headers
            .insert(header::CACHE_CONTROL, self.cache_control.clone());
        response
            .headers
            .insert(header::SERVER, HeaderValue::from_static(SERVER_NAME));

        if response.status == StatusCode::OK {
            let tag = etag::generate(&response.body, self.weak_etag);
            if let Ok(value) = HeaderValue::try_from(tag) {
                response.headers.insert(header::ETAG, value);
            }
        } else {
            response.headers.remove(header::ETAG);
        }
    }

    /// Handle one request end to end
    pub async fn dispatch(&self, ctx: &RequestContext, remote: SocketAddr) -> Response<Full<Bytes>> {
        let started = Instant::now();

        let mut outcome = self.resolve(ctx).await;
        self.finalize(&mut outcome.response);
        self.log_access(ctx, remote, &outcome, started);

        outcome.response.into_response(ctx.is_head)
    }

    fn log_access(
        &self,
        ctx: &RequestContext,
        remote: SocketAddr,
        outcome: &RequestOutcome,
        started: Instant,
    ) {
        let Some(format) = self.access_log_format.as_deref() else {
            return;
        };

        let mut entry = AccessLogEntry::new(
            remote.to_string(),
            ctx.method.to_string(),
            outcome.path.clone(),
        );
        entry.serve_root = self.file_server.root().display().to_string();
        entry.serve_target = outcome.target.to_string();
        entry.status = outcome.response.status.as_u16();
        entry.body_bytes = if ctx.is_head {
            0
        } else {
            outcome.response.body.len()
        };
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        self.logger.info(&entry.format(format));
    }
}

fn cache_control_value(max_age: u64) -> HeaderValue {
    HeaderValue::try_from(format!("max-age={max_age}, public"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}
