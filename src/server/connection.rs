// Connection handling module
// Serves a single accepted TCP connection, optionally over TLS

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;

use crate::handler::{Dispatcher, RequestContext};
use crate::logger::Logger;

/// Per-connection settings shared by all connections of a server
#[derive(Clone)]
pub struct ConnectionContext {
    pub dispatcher: Arc<Dispatcher>,
    pub logger: Arc<dyn Logger>,
    pub tls: Option<TlsAcceptor>,
    pub keep_alive: bool,
    /// Upper bound for the whole connection, None for unbounded
    pub timeout: Option<Duration>,
}

/// Handle a single connection in a spawned task
///
/// Failures are logged and only affect this connection.
pub fn spawn_connection(stream: TcpStream, remote: SocketAddr, ctx: ConnectionContext) {
    tokio::spawn(async move {
        let logger = Arc::clone(&ctx.logger);
        let timeout = ctx.timeout;
        let conn = handle_connection(stream, remote, ctx);

        match timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, conn).await.is_err() {
                    logger.warning(&format!(
                        "Connection from {remote} timed out after {} seconds",
                        limit.as_secs()
                    ));
                }
            }
            None => conn.await,
        }
    });
}

async fn handle_connection(stream: TcpStream, remote: SocketAddr, ctx: ConnectionContext) {
    match ctx.tls.clone() {
        Some(acceptor) => match acceptor.accept(stream).await {
            Ok(tls_stream) => serve_http(tls_stream, remote, &ctx).await,
            Err(e) => ctx
                .logger
                .warning(&format!("TLS handshake with {remote} failed: {e}")),
        },
        None => serve_http(stream, remote, &ctx).await,
    }
}

async fn serve_http<S>(stream: S, remote: SocketAddr, ctx: &ConnectionContext)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let dispatcher = Arc::clone(&ctx.dispatcher);
    let service = service_fn(move |req| {
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            let request = RequestContext::from_request(&req);
            Ok::<_, Infallible>(dispatcher.dispatch(&request, remote).await)
        }
    });

    let result = http1::Builder::new()
        .keep_alive(ctx.keep_alive)
        .serve_connection(TokioIo::new(stream), service)
        .await;

    if let Err(e) = result {
        // clients closing mid-request are routine
        if !e.is_incomplete_message() {
            ctx.logger
                .warning(&format!("Error serving connection from {remote}: {e}"));
        }
    }
}
