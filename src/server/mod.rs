//! Server lifecycle
//!
//! [`Server`] validates the configuration up front, then binds, optionally
//! loads TLS material and accepts connections until told to stop.

mod connection;
pub mod listener;
pub mod signal;
pub mod tls;

use std::future::Future;
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::{PerformanceConfig, ServerConfig, TlsPaths};
use crate::error::{ConfigError, ServerError};
use crate::handler::{Dispatcher, FileServer, FsFileServer};
use crate::logger::{Logger, NopLogger};
use connection::{spawn_connection, ConnectionContext};

pub use signal::shutdown_signal;

/// SPA fallback server
pub struct Server {
    config: ServerConfig,
    performance: PerformanceConfig,
    tls: Option<TlsPaths>,
    dispatcher: Dispatcher,
    logger: Arc<dyn Logger>,
}

impl Server {
    /// Validate `config` and build a server serving from `config.static_dir`
    ///
    /// Fails on an unparseable cache duration, a one-sided TLS pairing or an
    /// invalid static file pattern. Nothing is bound yet.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let files = FsFileServer::new(
            &config.static_dir,
            vec![config.index_file.clone()],
            config.compress,
        );
        Self::with_file_server(config, Arc::new(files))
    }

    /// Like [`Server::new`] with a custom file serving collaborator
    pub fn with_file_server(
        config: ServerConfig,
        file_server: Arc<dyn FileServer>,
    ) -> Result<Self, ConfigError> {
        let tls = config.tls()?;
        let dispatcher = Dispatcher::without_logger(&config, file_server)?;
        Ok(Self {
            config,
            performance: PerformanceConfig::default(),
            tls,
            dispatcher,
            logger: Arc::new(NopLogger),
        })
    }

    /// Replace the no-op logger
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.dispatcher.set_logger(Arc::clone(&logger));
        self.logger = logger;
    }

    /// Access log format name or pattern; None disables access logging
    pub fn set_access_log_format(&mut self, format: Option<String>) {
        self.dispatcher.set_access_log_format(format);
    }

    pub fn set_performance(&mut self, performance: PerformanceConfig) {
        self.performance = performance;
    }

    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Resolve the configured address and bind it
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = listener::resolve(&self.config.addr).await?;
        listener::bind(addr)
    }

    /// Bind and serve forever
    pub async fn listen_and_serve(self) -> Result<(), ServerError> {
        self.listen_and_serve_until(std::future::pending()).await
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn listen_and_serve_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Accept connections on `listener` until `shutdown` resolves
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let tls = self.tls.as_ref().map(tls::load_acceptor).transpose()?;
        let scheme = if tls.is_some() { "https" } else { "http" };
        let local_addr = listener
            .local_addr()
            .map_or_else(|_| self.config.addr.clone(), |a| a.to_string());

        let ctx = ConnectionContext {
            dispatcher: Arc::new(self.dispatcher),
            logger: Arc::clone(&self.logger),
            tls,
            keep_alive: self.performance.keep_alive,
            timeout: (self.performance.connection_timeout > 0)
                .then_some(Duration::from_secs(self.performance.connection_timeout)),
        };

        self.logger
            .info(&format!("Listening on {scheme}://{local_addr}"));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    self.logger.info("Server stopped accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => spawn_connection(stream, remote, ctx.clone()),
                    Err(e) if is_connection_error(e.kind()) => {
                        self.logger.warning(&format!("Failed to accept connection: {e}"));
                    }
                    Err(e) => return Err(ServerError::Accept(e)),
                },
            }
        }
    }
}

/// Errors caused by a single client rather than the listener
const fn is_connection_error(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
